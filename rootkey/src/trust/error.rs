// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module provides the error definitions for trust decisions.
//!
//! Each reason for refusing a candidate package is its own variant, so that the agent can log and
//! alert on a rollback attempt differently from, say, a package that simply lacks a signature.

use crate::error::ErrorCode;
use crate::package::error::Error as PackageError;
use thiserror::Error;

/// Specific error types for errors that can occur when validating or installing a root key
/// package.
#[derive(Error, Debug)]
pub enum TrustError {
    /// The candidate is older than the package that is currently trusted.
    #[error("Package version {candidate} is older than the trusted version {current}.")]
    RollbackDetected { candidate: u64, current: u64 },

    /// No signature on the candidate was a valid signature by an eligible anchor key.
    #[error("The package has no valid signature from a trusted root key.")]
    NoValidAnchorSignature,

    /// Some eligible anchor keys signed the candidate, but fewer than the quorum policy requires.
    #[error("The package has {valid} valid signatures from trusted root keys, but {required} are required.")]
    QuorumNotMet { valid: usize, required: usize },

    /// A test package was offered to a device that only accepts production packages.
    #[error("Test packages are not accepted.")]
    TestPackageRejected,

    /// A production package was offered to a device that only accepts test packages.
    #[error("Production packages are not accepted.")]
    ProductionPackageRejected,

    /// The trust anchor has no root keys that are eligible to sign.
    #[error("There are no eligible trust anchor keys.")]
    NoTrustAnchor,

    /// The candidate could not be parsed, persisted or serialized.
    #[error(transparent)]
    Package(#[from] PackageError),
}

impl TrustError {
    /// Gets the stable result code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TrustError::RollbackDetected { .. } => ErrorCode::RollbackDetected,
            TrustError::NoValidAnchorSignature => ErrorCode::NoValidAnchorSignature,
            TrustError::QuorumNotMet { .. } => ErrorCode::QuorumNotMet,
            TrustError::TestPackageRejected => ErrorCode::TestPackageRejected,
            TrustError::ProductionPackageRejected => ErrorCode::ProductionPackageRejected,
            TrustError::NoTrustAnchor => ErrorCode::NoTrustAnchor,
            TrustError::Package(e) => e.code(),
        }
    }
}
