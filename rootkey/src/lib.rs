// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! The rootkey crate contains the functionality required to parse, validate and query root key
//! packages, which are the root of trust for verifying update manifests on a managed device.
//!
//! A root key package is a JSON document with two parts: a set of `protectedProperties` (the
//! trusted root keys, revoked root keys and revoked manifest signing keys, plus a version), and a
//! list of `signatures` over the canonical encoding of those protected properties. A device starts
//! out trusting a built-in set of anchor keys, and from then on only accepts a new package when it
//! is signed by enough keys that the device already trusts, and is not older than the package that
//! is currently in force.
//!
//! The typical flow is:
//!
//! - [package::parse::parse] turns JSON text into a [package::RootKeyPackage].
//! - [trust::validate] checks that package against a [trust::TrustAnchor].
//! - [trust::store::TrustStore] holds the accepted package as process-wide state, swaps it
//!   atomically when a newer package is accepted, and answers revocation queries for the update
//!   manifest verifier through [trust::revocation::SigningKeyRevocation].

pub mod config;
pub mod error;
pub mod keys;
pub mod package;
pub mod signature;
pub mod store;
pub mod trust;

mod encoding;

#[cfg(test)]
mod testing;
