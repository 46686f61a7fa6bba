// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Identification of update manifest signing keys.
//!
//! Update manifests carry the key that signed them as a JWK-shaped JSON payload, for example:
//!
//! `````json
//! {
//!     "kty": "RSA",
//!     "alg": "RS256",
//!     "kid": "ADU.210609.R.S",
//!     "n": "<modulus bytes>",
//!     "e": "AQAB"
//! }
//! `````
//!
//! A signing key is identified for revocation purposes by a hash algorithm and the hash of its
//! public key. The hash is computed with [KeyParameters::public_key_hash], which is the same rule
//! used for root keys, so a disabled signing key entry produced by the package author will match
//! the identity computed here for the same key.

use super::error::KeyError;
use super::{HashAlgorithm, KeyParameters, KeyType, Result, RsaParameters};
use crate::encoding;
use crate::signature::SignatureAlgorithm;

use serde::Deserialize;

/// The members of the signing key payload that matter for identification. Other members, such
/// as `kid`, are permitted and ignored.
#[derive(Debug, Deserialize)]
struct SigningKeyPayload {
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
}

/// The identity of a signing key: the hash algorithm and the hash of the encoded public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningKeyIdentity {
    pub hash_algorithm: HashAlgorithm,
    pub public_key_hash: Vec<u8>,
}

/// Gets the public key parameters from a signing key payload.
pub fn parameters_from_signing_key_payload(payload: &str) -> Result<(KeyParameters, HashAlgorithm)> {
    let jwk: SigningKeyPayload = serde_json::from_str(payload)
        .map_err(|e| KeyError::SigningKeyPayloadBadFormat(e.to_string()))?;

    // The hash of the key identity follows the hash of the signature algorithm the key is
    // declared for. Payloads that omit the algorithm are RS256 keys.
    let hash_algorithm = match &jwk.alg {
        Some(alg) => alg.parse::<SignatureAlgorithm>()?.hash_algorithm(),
        None => HashAlgorithm::Sha256,
    };

    let parameters = match jwk.kty.parse::<KeyType>()? {
        KeyType::Rsa => {
            let n = encoding::decode_base64_any(&jwk.n)?;
            let e = encoding::decode_base64_any(&jwk.e)?;
            KeyParameters::Rsa(RsaParameters::new(n, e)?)
        }
    };

    Ok((parameters, hash_algorithm))
}

/// Extracts the hash algorithm and public key hash from a signing key payload.
pub fn alg_and_hash_from_signing_key_payload(payload: &str) -> Result<SigningKeyIdentity> {
    let (parameters, hash_algorithm) = parameters_from_signing_key_payload(payload)?;
    let public_key_hash = parameters.public_key_hash(hash_algorithm)?;
    Ok(SigningKeyIdentity {
        hash_algorithm,
        public_key_hash,
    })
}
