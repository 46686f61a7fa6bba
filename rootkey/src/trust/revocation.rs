// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Revocation queries for update manifest signing keys.
//!
//! The update manifest verifier identifies the key that signed a manifest by a hash algorithm and
//! the hash of its public key, and asks whether that identity is disallowed. A key is disallowed
//! exactly when the trusted package lists the same algorithm and hash in its
//! `disabledSigningKeys`.

use crate::keys;
use crate::keys::signing::alg_and_hash_from_signing_key_payload;
use crate::package::RootKeyPackage;

/// Answers whether a manifest signing key has been revoked.
pub trait SigningKeyRevocation {
    /// Checks whether the signing key with the given identity is disallowed. The algorithm name
    /// is compared without regard to case, and the hash must match exactly.
    fn is_signing_key_disallowed(&self, hash_algorithm: &str, public_key_hash: &[u8]) -> bool;

    /// Checks whether the signing key described by a JWK-shaped payload is disallowed, computing
    /// its identity in the same way that the package author does.
    fn is_signing_key_payload_disallowed(&self, payload: &str) -> keys::Result<bool> {
        let identity = alg_and_hash_from_signing_key_payload(payload)?;
        Ok(self.is_signing_key_disallowed(identity.hash_algorithm.as_str(), &identity.public_key_hash))
    }
}

impl SigningKeyRevocation for RootKeyPackage {
    fn is_signing_key_disallowed(&self, hash_algorithm: &str, public_key_hash: &[u8]) -> bool {
        self.disabled_signing_keys()
            .iter()
            .any(|key| key.matches(hash_algorithm, public_key_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;
    use crate::package::parse::parse;
    use crate::signature::SignatureAlgorithm;
    use crate::testing;
    use serde_json::json;

    fn package_disabling(hash_alg: &str, hash: &[u8]) -> RootKeyPackage {
        let k1 = testing::k1();
        let mut protected = testing::protected_properties(1, &[&k1], &[]);
        protected["disabledSigningKeys"] = json!([
            {"hashAlg": hash_alg, "hash": encoding::encode_base64url(hash)}
        ]);
        testing::signed_package(&protected, &[(&k1, SignatureAlgorithm::Rs256)])
    }

    #[test]
    fn test_exact_match_is_disallowed() {
        let hash = vec![0x5a; 32];
        let package = package_disabling("SHA256", &hash);
        assert!(package.is_signing_key_disallowed("SHA256", &hash));
        assert!(package.is_signing_key_disallowed("sha256", &hash));
    }

    #[test]
    fn test_single_bit_difference_is_allowed() {
        let hash = vec![0x5a; 32];
        let package = package_disabling("SHA256", &hash);
        for i in 0..hash.len() {
            for bit in 0..8 {
                let mut other = hash.clone();
                other[i] ^= 1 << bit;
                assert!(!package.is_signing_key_disallowed("SHA256", &other));
            }
        }
    }

    #[test]
    fn test_algorithm_must_match() {
        let hash = vec![0x5a; 32];
        let package = package_disabling("SHA256", &hash);
        assert!(!package.is_signing_key_disallowed("SHA384", &hash));
        assert!(!package.is_signing_key_disallowed("", &hash));
    }

    #[test]
    fn test_prefix_and_empty_hashes_are_allowed() {
        let hash = vec![0x5a; 32];
        let package = package_disabling("SHA256", &hash);
        assert!(!package.is_signing_key_disallowed("SHA256", &hash[..31]));
        assert!(!package.is_signing_key_disallowed("SHA256", &[]));
    }

    #[test]
    fn test_fixture_disallows_k3_payload() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        assert!(package.is_signing_key_payload_disallowed(testing::SIGNING_KEY_JWK).unwrap());

        let hash = base64::decode_config(testing::K3_SPKI_SHA256, base64::URL_SAFE_NO_PAD).unwrap();
        assert!(package.is_signing_key_disallowed("SHA256", &hash));

        // The same key identified with a different hash algorithm is not listed.
        let mut jwk: serde_json::Value = serde_json::from_str(testing::SIGNING_KEY_JWK).unwrap();
        jwk["alg"] = json!("RS512");
        assert!(!package.is_signing_key_payload_disallowed(&jwk.to_string()).unwrap());
    }

    #[test]
    fn test_other_signing_key_is_allowed() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        let k2 = testing::root_key_from_pem("K2", testing::K2_PEM);
        let hash = k2.public_key_hash(crate::keys::HashAlgorithm::Sha256).unwrap();
        assert!(!package.is_signing_key_disallowed("SHA256", &hash));
    }

    #[test]
    fn test_bad_payload_is_an_error() {
        let package = parse(testing::ROOTKEY_PACKAGE_V1).unwrap();
        assert!(package.is_signing_key_payload_disallowed("{}").is_err());
    }
}
