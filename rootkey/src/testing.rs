// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Shared fixtures for the unit tests of this crate.

use crate::encoding;
use crate::keys::local::LocalSigningKey;
use crate::keys::{KeyParameters, RootKey};
use crate::package::parse::parse;
use crate::package::{canonical, RootKeyPackage};
use crate::signature::SignatureAlgorithm;

use serde_json::{json, Value};

pub const K1_PEM: &str = include_str!("../testdata/k1.pem");
pub const K2_PEM: &str = include_str!("../testdata/k2.pem");
pub const K3_PEM: &str = include_str!("../testdata/k3.pem");

/// A version 1 package with root key `ADU.200702.R` (K1), signed with RS256 by K1 using an
/// external tool. Its single disabled signing key is K3.
pub const ROOTKEY_PACKAGE_V1: &str = include_str!("../testdata/rootkeypackage_v1.json");

/// The same protected properties as [ROOTKEY_PACKAGE_V1] in a different member order and
/// without whitespace, carrying a PS256 signature by K1.
pub const ROOTKEY_PACKAGE_V1_REORDERED: &str =
    include_str!("../testdata/rootkeypackage_v1_reordered.json");

/// The canonical encoding of the protected properties of [ROOTKEY_PACKAGE_V1].
pub const CANONICAL_V1: &[u8] = include_bytes!("../testdata/rootkeypackage_v1.canonical");

/// The public part of K3 as a manifest signing key payload.
pub const SIGNING_KEY_JWK: &str = include_str!("../testdata/signing_key_jwk.json");

/// SHA-256 and SHA-384 of the DER SubjectPublicKeyInfo of K3, in base64url.
pub const K3_SPKI_SHA256: &str = "0lEaVNIsSEOyphGidOxooeb5tsgFTrXVs7htj_0yfwU";
pub const K3_SPKI_SHA384: &str = "UcQyQeaUYZWYwVTIDebhQICmRt4P00oEoeADLR8GtJ7hVAv-i24MGSLQ5GR-EE2x";

pub fn k1() -> LocalSigningKey {
    LocalSigningKey::from_pem("K1", K1_PEM).unwrap()
}

pub fn k2() -> LocalSigningKey {
    LocalSigningKey::from_pem("K2", K2_PEM).unwrap()
}

pub fn k3() -> LocalSigningKey {
    LocalSigningKey::from_pem("K3", K3_PEM).unwrap()
}

pub fn root_key_from_pem(kid: &str, pem: &str) -> RootKey {
    LocalSigningKey::from_pem(kid, pem)
        .unwrap()
        .root_key()
        .unwrap()
}

/// Decodes the first signature of a package document.
pub fn fixture_signature(document: &str) -> Vec<u8> {
    let value: Value = serde_json::from_str(document).unwrap();
    let text = value["signatures"][0]["signature"].as_str().unwrap();
    encoding::decode_base64url(text).unwrap()
}

/// The `rootKeys` entry for a key.
pub fn root_key_entry(key: &LocalSigningKey) -> Value {
    let root_key = key.root_key().unwrap();
    match root_key.parameters() {
        KeyParameters::Rsa(rsa) => json!({
            "kid": root_key.kid(),
            "keyType": "RSA",
            "n": encoding::encode_base64url(rsa.modulus()),
            "e": encoding::encode_base64url(rsa.exponent()),
        }),
    }
}

/// Builds production protected properties listing the given root keys.
pub fn protected_properties(
    version: u64,
    root_keys: &[&LocalSigningKey],
    disabled_root_keys: &[&str],
) -> Value {
    let root_keys: Vec<Value> = root_keys.iter().map(|key| root_key_entry(key)).collect();
    json!({
        "version": version,
        "isTest": false,
        "rootKeys": root_keys,
        "disabledRootKeys": disabled_root_keys,
        "disabledSigningKeys": [],
    })
}

/// Signs the protected properties with each of the given keys, and returns the package text.
pub fn signed_package_json(
    protected_properties: &Value,
    signers: &[(&LocalSigningKey, SignatureAlgorithm)],
) -> String {
    let payload = canonical::encode(protected_properties).unwrap();
    let signatures: Vec<Value> = signers
        .iter()
        .map(|(key, alg)| {
            json!({
                "signingKeyId": key.kid(),
                "alg": alg.as_str(),
                "signature": encoding::encode_base64url(&key.sign(&payload, *alg).unwrap()),
            })
        })
        .collect();

    json!({
        "protectedProperties": protected_properties,
        "signatures": signatures,
    })
    .to_string()
}

pub fn signed_package(
    protected_properties: &Value,
    signers: &[(&LocalSigningKey, SignatureAlgorithm)],
) -> RootKeyPackage {
    parse(&signed_package_json(protected_properties, signers)).unwrap()
}
