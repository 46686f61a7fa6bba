// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Stable result codes for reporting failures to the agent.
//!
//! Each module has its own error enum (see [crate::package::error], [crate::keys::error] and
//! [crate::trust::error]), which is what callers should match on when they need the details. The
//! [ErrorCode] is a flattened view of those enums, so that the update pipeline can log, alert and
//! report each distinct kind of failure without knowing how the errors are nested.

/// A flattened, stable identification of the kind of failure that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The package (or some other input document) is malformed or has missing fields.
    BadFormat,

    /// A key uses a `keyType` that this crate does not support.
    UnsupportedKeyType,

    /// A signature or hash uses an algorithm that this crate does not support.
    UnsupportedAlgorithm,

    /// Key or signature buffers are structurally unusable, such as a zero-length modulus.
    InvalidKeyMaterial,

    /// The candidate package is older than the package currently in force.
    RollbackDetected,

    /// None of the candidate's signatures was produced by an eligible anchor key.
    NoValidAnchorSignature,

    /// Some anchor keys signed the candidate, but not as many as the quorum policy requires.
    QuorumNotMet,

    /// A test package was offered to a device that only accepts production packages.
    TestPackageRejected,

    /// A production package was offered to a device that only accepts test packages.
    ProductionPackageRejected,

    /// There are no eligible anchor keys to validate against.
    NoTrustAnchor,

    /// Reading or writing the persisted package failed.
    Io,
}

impl ErrorCode {
    /// A short, stable name for the code, suitable for logs and status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadFormat => "BadFormat",
            ErrorCode::UnsupportedKeyType => "UnsupportedKeyType",
            ErrorCode::UnsupportedAlgorithm => "UnsupportedAlgorithm",
            ErrorCode::InvalidKeyMaterial => "InvalidKeyMaterial",
            ErrorCode::RollbackDetected => "RollbackDetected",
            ErrorCode::NoValidAnchorSignature => "NoValidAnchorSignature",
            ErrorCode::QuorumNotMet => "QuorumNotMet",
            ErrorCode::TestPackageRejected => "TestPackageRejected",
            ErrorCode::ProductionPackageRejected => "ProductionPackageRejected",
            ErrorCode::NoTrustAnchor => "NoTrustAnchor",
            ErrorCode::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
