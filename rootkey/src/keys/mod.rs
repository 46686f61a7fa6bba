// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module defines the key material model for root key packages.
//!
//! There are two relevant kinds of key: _root keys_ and _signing keys_.
//!
//! Root keys are long-lived public keys that act as trust anchors. They are listed in the
//! `rootKeys` section of a root key package, and their signatures over a package are what allow
//! a device to accept it. A device initially trusts a small built-in set of root keys, and learns
//! about new root keys only from packages that it has accepted.
//!
//! Signing keys are (possibly short-lived) keys that sign individual update manifests. They are
//! not listed in the package at all. Instead, the package carries a list of _disabled_ signing
//! keys, each identified by a hash algorithm and a hash of the encoded public key. The
//! [signing] submodule derives that identity from the signing key payload found in a manifest,
//! using exactly the same hashing rule as [KeyParameters::public_key_hash], so that both sides
//! agree on what a key's identity is.
//!
//! Key parameters are a tagged variant over explicit per-algorithm structures. Adding a new key
//! type means adding a variant here, and the compiler will then point at every place (such as
//! signature verification) that needs to handle it.

pub mod error;
pub mod local;
pub mod signing;

use error::KeyError;
use pkcs8::ToPublicKey;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Convenient result alias for this module, where errors are of type [KeyError].
pub type Result<T> = std::result::Result<T, error::KeyError>;

/// The key types that can appear in the `keyType` member of a root key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// An RSA public key, described by its modulus and public exponent.
    Rsa,
}

impl KeyType {
    /// The name of the key type as it appears in the package.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa => "RSA",
        }
    }
}

impl FromStr for KeyType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<KeyType> {
        match s {
            "RSA" => Ok(KeyType::Rsa),
            other => Err(KeyError::UnsupportedKeyType(other.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hash algorithms that can be used to identify a signing key by the hash of its public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// The canonical (upper-case) name of the algorithm, as used in the `hashAlg` member of a
    /// disabled signing key.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Computes the digest of the given data with this algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = KeyError;

    /// Parses an algorithm name. Names are matched without regard to case.
    fn from_str(s: &str) -> Result<HashAlgorithm> {
        match s.to_ascii_uppercase().as_str() {
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(KeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The public parameters of an RSA key.
///
/// Both the modulus and the exponent are held as opaque big-endian byte buffers, exactly as they
/// were decoded from the package. They are only converted into big integers when the key is
/// actually used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaParameters {
    n: Vec<u8>,
    e: Vec<u8>,
}

impl RsaParameters {
    /// Makes a set of RSA parameters from the big-endian modulus and exponent bytes. Fails with
    /// [KeyError::InvalidKeyMaterial] if either buffer is empty or holds the value zero.
    pub fn new(n: Vec<u8>, e: Vec<u8>) -> Result<RsaParameters> {
        if is_zero(&n) {
            return Err(KeyError::InvalidKeyMaterial(
                "RSA modulus is empty or zero".to_string(),
            ));
        }

        if is_zero(&e) {
            return Err(KeyError::InvalidKeyMaterial(
                "RSA exponent is empty or zero".to_string(),
            ));
        }

        Ok(RsaParameters { n, e })
    }

    /// The modulus, as big-endian bytes.
    pub fn modulus(&self) -> &[u8] {
        &self.n
    }

    /// The public exponent, as big-endian bytes.
    pub fn exponent(&self) -> &[u8] {
        &self.e
    }

    /// Makes a usable RSA public key from the parameters.
    pub fn to_public_key(&self) -> Result<RsaPublicKey> {
        RsaPublicKey::new(BigUint::from_bytes_be(&self.n), BigUint::from_bytes_be(&self.e))
            .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()))
    }
}

/// Algorithm-specific public key material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyParameters {
    Rsa(RsaParameters),
}

impl KeyParameters {
    /// The key type that these parameters belong to.
    pub fn key_type(&self) -> KeyType {
        match self {
            KeyParameters::Rsa(_) => KeyType::Rsa,
        }
    }

    /// Encodes the public key as a DER `SubjectPublicKeyInfo` structure. This is the canonical
    /// encoding over which public key hashes are computed.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        match self {
            KeyParameters::Rsa(rsa) => {
                let document = rsa.to_public_key()?.to_public_key_der()?;
                Ok(document.as_ref().to_vec())
            }
        }
    }

    /// Computes the identity hash of the public key with the given algorithm. Two keys are the
    /// same key exactly when their hashes are equal.
    pub fn public_key_hash(&self, algorithm: HashAlgorithm) -> Result<Vec<u8>> {
        let der = self.public_key_der()?;
        Ok(algorithm.digest(&der))
    }
}

/// A root key: a trust anchor candidate, identified by its key id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootKey {
    kid: String,
    parameters: KeyParameters,
}

impl RootKey {
    /// Makes a root key from its id and public parameters. The key id must not be empty.
    pub fn new(kid: &str, parameters: KeyParameters) -> Result<RootKey> {
        if kid.is_empty() {
            return Err(KeyError::InvalidKeyMaterial(
                "root key id is empty".to_string(),
            ));
        }

        Ok(RootKey {
            kid: kid.to_string(),
            parameters,
        })
    }

    /// The key id (the `kid` member in the package).
    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn key_type(&self) -> KeyType {
        self.parameters.key_type()
    }

    pub fn parameters(&self) -> &KeyParameters {
        &self.parameters
    }

    /// Computes the identity hash of this key's public key.
    pub fn public_key_hash(&self, algorithm: HashAlgorithm) -> Result<Vec<u8>> {
        self.parameters.public_key_hash(algorithm)
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}
