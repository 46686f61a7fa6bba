// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module implements root key signing in terms of RSA keys that are simply held in local
//! process memory.
//!
//! Devices never hold root private keys, so nothing on the device side uses this module. It
//! exists for the package authoring side: building and signing root key packages in dev/test
//! environments, and in the test suites of this crate.

use super::error::KeyError;
use super::{KeyParameters, Result, RootKey, RsaParameters};
use crate::signature::SignatureAlgorithm;

use pkcs1::FromRsaPrivateKey;
use pkcs8::FromPrivateKey;
use rsa::{PublicKeyParts, RsaPrivateKey as RsaPriv, RsaPublicKey as RsaPub};

/// An RSA key pair in local memory, named by the key id that its public part will have as a
/// root key.
pub struct LocalSigningKey {
    kid: String,
    private_key: RsaPriv,
    public_key: RsaPub,
}

impl LocalSigningKey {
    /// Loads an RSA private key from PEM text. Both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`) encodings are accepted.
    pub fn from_pem(kid: &str, pem: &str) -> Result<LocalSigningKey> {
        let private_key = match RsaPriv::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(_) => RsaPriv::from_pkcs1_pem(pem)?,
        };
        LocalSigningKey::from_private_key(kid, private_key)
    }

    fn from_private_key(kid: &str, private_key: RsaPriv) -> Result<LocalSigningKey> {
        if kid.is_empty() {
            return Err(KeyError::InvalidKeyMaterial(
                "root key id is empty".to_string(),
            ));
        }

        let public_key = RsaPub::from(&private_key);
        Ok(LocalSigningKey {
            kid: kid.to_string(),
            private_key,
            public_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Gets the public part of the key pair as a root key, ready to be listed in the `rootKeys`
    /// of a package or used as a built-in anchor.
    pub fn root_key(&self) -> Result<RootKey> {
        let parameters = RsaParameters::new(
            self.public_key.n().to_bytes_be(),
            self.public_key.e().to_bytes_be(),
        )?;
        RootKey::new(&self.kid, KeyParameters::Rsa(parameters))
    }

    /// Signs the given payload with the given algorithm. The payload is hashed as part of the
    /// signing process; callers pass the canonical bytes, not a digest.
    pub fn sign(&self, payload: &[u8], algorithm: SignatureAlgorithm) -> Result<Vec<u8>> {
        let digest = algorithm.hash_algorithm().digest(payload);
        let signature = self.private_key.sign(algorithm.padding_scheme(), &digest)?;
        Ok(signature)
    }
}
