// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Error definitions/handling.

use thiserror::Error;

/// Errors in rootkey-tool
#[derive(Error, Debug)]
pub enum Error {
    /// Error emanating from standard I/O.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Errors coming from the package file processing, due to the package being unreadable or
    /// malformed in some way.
    #[error(transparent)]
    PackageProcessingError(#[from] rootkey::package::error::Error),

    /// The package was parsed, but is not trusted by the device.
    #[error(transparent)]
    TrustError(#[from] rootkey::trust::error::TrustError),

    /// Errors relating to signing keys and signing key payloads.
    #[error(transparent)]
    KeyError(#[from] rootkey::keys::error::KeyError),

    /// The trust configuration could not be loaded.
    #[error(transparent)]
    ConfigError(#[from] rootkey::config::ConfigError),

    /// A hash given on the command-line is not valid base64url.
    #[error(transparent)]
    Base64DecodeError(#[from] base64::DecodeError),

    /// Error emanating from the rootkey-tool itself.
    #[error(transparent)]
    ToolError(#[from] ToolErrorKind),
}

/// Errors originating in the rootkey-tool itself.
#[derive(Error, Debug)]
pub enum ToolErrorKind {
    /// There is some missing configuration for a command, such as a required environment variable or
    /// configuration file/option.
    #[error("Missing configuration")]
    MissingConfiguration,
}

/// A Result type with the Err variant set as a ToolError
pub type Result<T> = std::result::Result<T, Error>;
