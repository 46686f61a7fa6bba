// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module implements the root key package document.
//!
//! A root key package is a JSON document with two top-level members:
//!
//! - `protectedProperties`, which holds the package `version`, the `isTest` flag, the trusted
//!   `rootKeys`, the ids of revoked root keys in `disabledRootKeys`, and the identities of revoked
//!   manifest signing keys in `disabledSigningKeys`.
//! - `signatures`, a list of signatures over the [canonical] encoding of the protected properties.
//!   Signatures are not themselves protected, so a package can gain signatures without changing
//!   what was signed.
//!
//! A [RootKeyPackage] is only ever built whole by [parse::parse], and is immutable afterwards. A
//! package that has been parsed has not yet been trusted: that decision belongs to
//! [crate::trust::validate].

pub mod canonical;
pub mod error;
pub mod parse;

use crate::encoding;
use crate::keys::RootKey;

use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Convenient result alias for this module.
pub type Result<T> = std::result::Result<T, error::Error>;

/// The identity of a revoked manifest signing key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisabledSigningKey {
    hash_algorithm: String,
    public_key_hash: Vec<u8>,
}

impl DisabledSigningKey {
    pub fn new(hash_algorithm: &str, public_key_hash: Vec<u8>) -> DisabledSigningKey {
        DisabledSigningKey {
            hash_algorithm: hash_algorithm.to_string(),
            public_key_hash,
        }
    }

    /// The hash algorithm name, as given in the `hashAlg` member.
    pub fn hash_algorithm(&self) -> &str {
        &self.hash_algorithm
    }

    pub fn public_key_hash(&self) -> &[u8] {
        &self.public_key_hash
    }

    /// Checks whether this entry names the given signing key identity. Algorithm names are
    /// compared without regard to case, and hashes must be identical.
    pub fn matches(&self, hash_algorithm: &str, public_key_hash: &[u8]) -> bool {
        self.hash_algorithm.eq_ignore_ascii_case(hash_algorithm)
            && self.public_key_hash == public_key_hash
    }
}

/// A signature over the canonical protected properties of a package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    signing_key_id: String,
    algorithm: String,
    signature: Vec<u8>,
}

impl Signature {
    pub fn new(signing_key_id: &str, algorithm: &str, signature: Vec<u8>) -> Signature {
        Signature {
            signing_key_id: signing_key_id.to_string(),
            algorithm: algorithm.to_string(),
            signature,
        }
    }

    /// The id of the root key that claims to have made this signature. The key may be listed in
    /// this package or only in the package that is currently trusted.
    pub fn signing_key_id(&self) -> &str {
        &self.signing_key_id
    }

    /// The algorithm name, as given in the `alg` member. Names that are not recognized are kept
    /// here, and such signatures are discarded during validation.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn to_json_value(&self) -> Value {
        json!({
            "signingKeyId": self.signing_key_id,
            "alg": self.algorithm,
            "signature": encoding::encode_base64url(&self.signature),
        })
    }
}

/// The signed part of a package.
#[derive(Clone, Debug, PartialEq)]
pub struct ProtectedProperties {
    version: u64,
    is_test: bool,
    root_keys: Vec<RootKey>,
    disabled_root_keys: BTreeSet<String>,
    disabled_signing_keys: BTreeSet<DisabledSigningKey>,

    // The subtree as parsed, including members that are not modelled above. It is what gets
    // signed, and what gets written back out when the package is persisted.
    source: Value,
    canonical: Vec<u8>,
}

/// A complete root key package, as parsed from a single JSON document.
#[derive(Clone, Debug, PartialEq)]
pub struct RootKeyPackage {
    protected_properties: ProtectedProperties,
    signatures: Vec<Signature>,
}

impl RootKeyPackage {
    pub fn version(&self) -> u64 {
        self.protected_properties.version
    }

    /// Whether this package is intended only for test devices.
    pub fn is_test(&self) -> bool {
        self.protected_properties.is_test
    }

    /// All root keys listed in the package, including any that the package itself disables.
    pub fn root_keys(&self) -> &[RootKey] {
        &self.protected_properties.root_keys
    }

    pub fn disabled_root_keys(&self) -> &BTreeSet<String> {
        &self.protected_properties.disabled_root_keys
    }

    pub fn disabled_signing_keys(&self) -> &BTreeSet<DisabledSigningKey> {
        &self.protected_properties.disabled_signing_keys
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The canonical encoding of the protected properties. This is the exact payload over which
    /// the signatures were computed.
    pub fn canonical_protected_properties(&self) -> &[u8] {
        &self.protected_properties.canonical
    }

    /// The root keys of this package that it does not itself disable.
    pub fn active_root_keys(&self) -> impl Iterator<Item = &RootKey> {
        self.root_keys()
            .iter()
            .filter(move |key| !self.is_root_key_disabled(key.kid()))
    }

    /// Checks whether the given root key id is listed in `disabledRootKeys`.
    pub fn is_root_key_disabled(&self, kid: &str) -> bool {
        self.protected_properties.disabled_root_keys.contains(kid)
    }

    /// Finds the active root key with the given id. Unknown and disabled ids give `None`.
    pub fn key_for_kid(&self, kid: &str) -> Option<&RootKey> {
        self.active_root_keys().find(|key| key.kid() == kid)
    }

    /// Makes a copy of this package with one more signature.
    pub fn with_signature(&self, signature: Signature) -> RootKeyPackage {
        let mut package = self.clone();
        package.signatures.push(signature);
        package
    }

    /// Gets the package as a JSON document in the same shape that it was parsed from.
    pub fn to_json_value(&self) -> Value {
        let signatures: Vec<Value> = self.signatures.iter().map(Signature::to_json_value).collect();
        json!({
            "protectedProperties": self.protected_properties.source,
            "signatures": signatures,
        })
    }

    /// Serializes the package as pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        let text = serde_json::to_string_pretty(&self.to_json_value())?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::parse::parse;
    use super::*;
    use crate::keys::HashAlgorithm;
    use crate::signature::SignatureAlgorithm;
    use crate::testing;

    #[test]
    fn test_fixture_accessors() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        assert_eq!(1, package.version());
        assert!(!package.is_test());
        assert_eq!(1, package.root_keys().len());
        assert_eq!("ADU.200702.R", package.root_keys()[0].kid());
        assert!(package.disabled_root_keys().is_empty());
        assert_eq!(1, package.disabled_signing_keys().len());
        assert_eq!(1, package.signatures().len());
        assert_eq!("RS256", package.signatures()[0].algorithm());
        assert_eq!(testing::CANONICAL_V1, package.canonical_protected_properties());
    }

    #[test]
    fn test_key_for_kid() {
        let k1 = testing::k1();
        let k2 = testing::k2();
        let protected = testing::protected_properties(3, &[&k1, &k2], &["K2"]);
        let package = testing::signed_package(&protected, &[(&k1, SignatureAlgorithm::Rs256)]);

        assert_eq!("K1", package.key_for_kid("K1").unwrap().kid());
        assert!(package.key_for_kid("K2").is_none());
        assert!(package.key_for_kid("K9").is_none());
        assert!(package.is_root_key_disabled("K2"));
        assert!(!package.is_root_key_disabled("K1"));

        let active: Vec<&str> = package.active_root_keys().map(|key| key.kid()).collect();
        assert_eq!(vec!["K1"], active);
    }

    #[test]
    fn test_disabled_signing_key_matches() {
        let key = DisabledSigningKey::new("SHA256", vec![1, 2, 3]);
        assert!(key.matches("SHA256", &[1, 2, 3]));
        assert!(key.matches("sha256", &[1, 2, 3]));
        assert!(!key.matches("SHA384", &[1, 2, 3]));
        assert!(!key.matches("SHA256", &[1, 2, 2]));
        assert!(!key.matches("SHA256", &[1, 2]));
    }

    #[test]
    fn test_json_round_trip_keeps_signed_bytes() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        let text = package.to_json_string().unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(package, reparsed);
        assert_eq!(testing::CANONICAL_V1, reparsed.canonical_protected_properties());
    }

    #[test]
    fn test_unknown_members_are_kept() {
        let k1 = testing::k1();
        let mut protected = testing::protected_properties(1, &[&k1], &[]);
        protected["comment"] = Value::String("rotation drill".to_string());
        let package = testing::signed_package(&protected, &[(&k1, SignatureAlgorithm::Rs256)]);

        let value = package.to_json_value();
        assert_eq!("rotation drill", value["protectedProperties"]["comment"]);
        assert!(std::str::from_utf8(package.canonical_protected_properties())
            .unwrap()
            .contains("\"comment\":\"rotation drill\""));
    }

    #[test]
    fn test_with_signature() {
        let k1 = testing::k1();
        let k2 = testing::k2();
        let protected = testing::protected_properties(1, &[&k1, &k2], &[]);
        let package = testing::signed_package(&protected, &[(&k1, SignatureAlgorithm::Rs256)]);

        let bytes = k2
            .sign(package.canonical_protected_properties(), SignatureAlgorithm::Ps384)
            .unwrap();
        let signed = package.with_signature(Signature::new("K2", "PS384", bytes));
        assert_eq!(1, package.signatures().len());
        assert_eq!(2, signed.signatures().len());
        assert_eq!("K2", signed.signatures()[1].signing_key_id());
        assert_eq!(package.canonical_protected_properties(), signed.canonical_protected_properties());
        assert_ne!(package, signed);
    }

    #[test]
    fn test_disabled_signing_key_fixture() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        let k3 = testing::root_key_from_pem("K3", testing::K3_PEM);
        let hash = k3.public_key_hash(HashAlgorithm::Sha256).unwrap();
        let entry = package.disabled_signing_keys().iter().next().unwrap();
        assert_eq!("SHA256", entry.hash_algorithm());
        assert_eq!(hash.as_slice(), entry.public_key_hash());
    }
}
