// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module provides the error definitions for errors that can occur when constructing,
//! hashing or using public and private key material.

use crate::error::ErrorCode;
use thiserror::Error;

/// Specific error types for errors that can occur within the key material model.
#[derive(Error, Debug)]
pub enum KeyError {
    /// A key was declared with a `keyType` that is not recognized. New key types can be added to
    /// the format without breaking old packages, but a device that does not understand a key type
    /// must not silently drop the key.
    #[error("Unsupported key type '{0}'.")]
    UnsupportedKeyType(String),

    /// A signature or hash algorithm name is not recognized.
    #[error("Unsupported algorithm '{0}'.")]
    UnsupportedAlgorithm(String),

    /// The key or signature buffers are structurally unusable, such as a zero-length modulus.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// A signing key payload (a JWK-shaped JSON object from an update manifest) does not have
    /// the expected members.
    #[error("The signing key payload is not in the expected format: {0}")]
    SigningKeyPayloadBadFormat(String),

    #[error(transparent)]
    Base64DecodeError(#[from] base64::DecodeError),

    /// Errors relating to JSON processing.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Error emanating from standard I/O.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Error coming from the RSA crate, which can happen when key parameters do not describe a
    /// usable RSA key, or when signing fails.
    #[error(transparent)]
    RsaError(#[from] rsa::errors::Error),

    /// Error coming from the PKCS1 crate, which can happen when loading PKCS#1 encoded keys.
    #[error(transparent)]
    Pkcs1Error(#[from] pkcs1::Error),

    /// Error coming from the PKCS8 crate, which can happen when loading PKCS#8 encoded keys or
    /// when encoding a public key as a SubjectPublicKeyInfo structure.
    #[error(transparent)]
    Pkcs8Error(#[from] pkcs8::Error),
}

impl KeyError {
    /// Gets the stable result code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            KeyError::UnsupportedKeyType(_) => ErrorCode::UnsupportedKeyType,
            KeyError::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            KeyError::InvalidKeyMaterial(_)
            | KeyError::RsaError(_)
            | KeyError::Pkcs1Error(_)
            | KeyError::Pkcs8Error(_) => ErrorCode::InvalidKeyMaterial,
            KeyError::SigningKeyPayloadBadFormat(_)
            | KeyError::Base64DecodeError(_)
            | KeyError::JsonError(_) => ErrorCode::BadFormat,
            KeyError::IoError(_) => ErrorCode::Io,
        }
    }
}
