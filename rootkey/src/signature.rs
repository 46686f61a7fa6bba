// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Verification of the signatures carried by root key packages.
//!
//! A signature names its algorithm with a JWA-style string such as `RS256`. Verification is done
//! with the primitives from the `rsa` crate, which compare the recovered encoded message in
//! constant time, so a forged signature gives no timing signal about how much of it matched.

use crate::keys::error::KeyError;
use crate::keys::{HashAlgorithm, KeyParameters, Result};

use log::debug;
use rand::rngs::OsRng;
use rsa::hash::Hash;
use rsa::{PaddingScheme, PublicKey};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// The signature algorithms that can be named in the `alg` member of a package signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSA with PKCS#1 v1.5 padding over a SHA-256 digest.
    Rs256,
    /// RSA with PKCS#1 v1.5 padding over a SHA-384 digest.
    Rs384,
    /// RSA with PKCS#1 v1.5 padding over a SHA-512 digest.
    Rs512,
    /// RSA-PSS with MGF1, over a SHA-256 digest.
    Ps256,
    /// RSA-PSS with MGF1, over a SHA-384 digest.
    Ps384,
    /// RSA-PSS with MGF1, over a SHA-512 digest.
    Ps512,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rs256 => "RS256",
            SignatureAlgorithm::Rs384 => "RS384",
            SignatureAlgorithm::Rs512 => "RS512",
            SignatureAlgorithm::Ps256 => "PS256",
            SignatureAlgorithm::Ps384 => "PS384",
            SignatureAlgorithm::Ps512 => "PS512",
        }
    }

    /// The digest algorithm applied to the payload before signing.
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            SignatureAlgorithm::Rs256 | SignatureAlgorithm::Ps256 => HashAlgorithm::Sha256,
            SignatureAlgorithm::Rs384 | SignatureAlgorithm::Ps384 => HashAlgorithm::Sha384,
            SignatureAlgorithm::Rs512 | SignatureAlgorithm::Ps512 => HashAlgorithm::Sha512,
        }
    }

    /// Gets the RSA padding scheme for this algorithm. PSS salt lengths are detected when
    /// verifying.
    pub(crate) fn padding_scheme(&self) -> PaddingScheme {
        match self {
            SignatureAlgorithm::Rs256 => PaddingScheme::new_pkcs1v15_sign(Some(Hash::SHA2_256)),
            SignatureAlgorithm::Rs384 => PaddingScheme::new_pkcs1v15_sign(Some(Hash::SHA2_384)),
            SignatureAlgorithm::Rs512 => PaddingScheme::new_pkcs1v15_sign(Some(Hash::SHA2_512)),
            SignatureAlgorithm::Ps256 => PaddingScheme::new_pss::<Sha256, _>(OsRng),
            SignatureAlgorithm::Ps384 => PaddingScheme::new_pss::<Sha384, _>(OsRng),
            SignatureAlgorithm::Ps512 => PaddingScheme::new_pss::<Sha512, _>(OsRng),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<SignatureAlgorithm> {
        match s {
            "RS256" => Ok(SignatureAlgorithm::Rs256),
            "RS384" => Ok(SignatureAlgorithm::Rs384),
            "RS512" => Ok(SignatureAlgorithm::Rs512),
            "PS256" => Ok(SignatureAlgorithm::Ps256),
            "PS384" => Ok(SignatureAlgorithm::Ps384),
            "PS512" => Ok(SignatureAlgorithm::Ps512),
            other => Err(KeyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that `signature` is a valid signature over `payload` by the given public key.
///
/// A well-formed signature that does not verify is reported as `Ok(false)`. Errors are reserved
/// for inputs that cannot be checked at all: an empty signature, or key parameters that do not
/// describe a usable key.
pub fn verify(
    payload: &[u8],
    signature: &[u8],
    key: &KeyParameters,
    algorithm: SignatureAlgorithm,
) -> Result<bool> {
    if signature.is_empty() {
        return Err(KeyError::InvalidKeyMaterial("signature is empty".to_string()));
    }

    match key {
        KeyParameters::Rsa(rsa) => {
            let public_key = rsa.to_public_key()?;
            let digest = algorithm.hash_algorithm().digest(payload);
            match public_key.verify(algorithm.padding_scheme(), &digest, signature) {
                Ok(()) => Ok(true),
                Err(e) => {
                    debug!("{} signature did not verify: {}", algorithm, e);
                    Ok(false)
                }
            }
        }
    }
}
