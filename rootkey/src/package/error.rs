// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module provides the error definitions for errors that can occur within the parsing,
//! serialization and persistence of root key packages.

use crate::error::ErrorCode;
use crate::keys::error::KeyError;
use thiserror::Error;

/// Specific error types for errors that can occur while handling root key packages.
#[derive(Error, Debug)]
pub enum Error {
    /// An error that has been re-badged from the `std::io` subsystem. This kind of error might
    /// arise when the persisted package cannot be read or written.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Error coming from the serde_json crate while serializing a package. Malformed input
    /// documents are reported as [PackageErrorKind::BadFormat] instead.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// A key within the package could not be constructed, because its type is not supported or
    /// because its parameters are unusable.
    #[error(transparent)]
    KeyError(#[from] KeyError),

    /// This kind of error represents a malformation of the package document.
    #[error(transparent)]
    PackageError(#[from] PackageErrorKind),
}

impl Error {
    /// Gets the stable result code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::IoError(_) => ErrorCode::Io,
            Error::JsonError(_) => ErrorCode::BadFormat,
            Error::KeyError(e) => e.code(),
            Error::PackageError(PackageErrorKind::BadFormat(_)) => ErrorCode::BadFormat,
        }
    }
}

/// These error variants refer to errors that are raised directly by code in the package module,
/// as opposed to errors that are simply being re-badged from underlying subsystems such as I/O.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackageErrorKind {
    /// The document is empty, is not JSON, or does not have the required structure. The string
    /// describes the offending part of the document.
    #[error("The root key package is malformed: {0}")]
    BadFormat(String),
}

/// Shorthand for making a [PackageErrorKind::BadFormat] error.
pub(crate) fn bad_format<S: Into<String>>(detail: S) -> Error {
    Error::PackageError(PackageErrorKind::BadFormat(detail.into()))
}
