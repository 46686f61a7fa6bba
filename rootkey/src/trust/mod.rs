// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! This module makes the trust decision for candidate root key packages.
//!
//! A candidate is judged against a _trust anchor_, which is either the device's built-in root keys
//! (before any package has been accepted) or the package that is currently trusted. Only the
//! anchor decides which keys may vouch for the candidate: the candidate's own `rootKeys` become
//! trusted once it is accepted, and its own `disabledRootKeys` cannot re-enable a key that the
//! anchor has revoked.
//!
//! [validate] checks, in this order:
//!
//! 1. The candidate's version is not older than the anchor's version.
//! 2. The anchor has at least one eligible key.
//! 3. Enough distinct eligible keys have validly signed the canonical protected properties to
//!    meet the [QuorumPolicy].
//! 4. The candidate's `isTest` flag matches the device's [TrustPolicy].

pub mod error;
pub mod revocation;
pub mod store;

use crate::keys::RootKey;
use crate::package::RootKeyPackage;
use crate::signature::{self, SignatureAlgorithm};
use error::TrustError;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Convenient result alias for this module.
pub type Result<T> = std::result::Result<T, TrustError>;

/// How many distinct eligible anchor keys must sign a candidate package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuorumPolicy {
    /// A fixed number of signatures.
    AtLeast(usize),
    /// More than half of the eligible keys.
    Majority,
    /// Every eligible key.
    All,
}

impl QuorumPolicy {
    /// Computes how many valid signatures are required when the anchor has `eligible` keys. The
    /// result is never less than one.
    pub fn threshold(&self, eligible: usize) -> usize {
        let required = match self {
            QuorumPolicy::AtLeast(count) => *count,
            QuorumPolicy::Majority => eligible / 2 + 1,
            QuorumPolicy::All => eligible,
        };
        required.max(1)
    }
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        QuorumPolicy::AtLeast(1)
    }
}

/// The device-wide rules for accepting packages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrustPolicy {
    pub quorum: QuorumPolicy,

    /// Test devices accept only test packages, and production devices only production
    /// packages.
    pub accept_test_packages: bool,
}

/// The root keys that a device trusts before it has accepted any package. They are treated as
/// an anchor at version zero with nothing disabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuiltinAnchors {
    keys: Vec<RootKey>,
}

impl BuiltinAnchors {
    /// Makes the anchor set. A key id is only counted once, so later keys with the id of an
    /// earlier key are dropped.
    pub fn new(keys: Vec<RootKey>) -> BuiltinAnchors {
        let mut unique: Vec<RootKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if unique.iter().any(|existing| existing.kid() == key.kid()) {
                warn!("Ignoring duplicate built-in anchor key '{}'.", key.kid());
                continue;
            }
            unique.push(key);
        }
        BuiltinAnchors { keys: unique }
    }

    pub fn keys(&self) -> &[RootKey] {
        &self.keys
    }

    pub fn key_for_kid(&self, kid: &str) -> Option<&RootKey> {
        self.keys.iter().find(|key| key.kid() == kid)
    }
}

/// The trust anchor that a candidate package is validated against.
#[derive(Clone, Copy, Debug)]
pub enum TrustAnchor<'a> {
    Builtin(&'a BuiltinAnchors),
    Package(&'a RootKeyPackage),
}

impl<'a> TrustAnchor<'a> {
    pub fn version(&self) -> u64 {
        match self {
            TrustAnchor::Builtin(_) => 0,
            TrustAnchor::Package(package) => package.version(),
        }
    }

    /// The keys that may vouch for a candidate: the anchor's root keys, minus those that the
    /// anchor itself disables.
    pub fn eligible_keys(&self) -> Vec<&'a RootKey> {
        match *self {
            TrustAnchor::Builtin(anchors) => anchors.keys().iter().collect(),
            TrustAnchor::Package(package) => package.active_root_keys().collect(),
        }
    }
}

/// The record of a successful validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acceptance {
    /// The ids of the eligible keys that validly signed the candidate.
    pub signers: BTreeSet<String>,
    /// The number of signatures that the quorum policy required.
    pub required: usize,
}

/// Decides whether `candidate` is trustworthy given `anchor` and `policy`.
///
/// Signatures that name an unknown or revoked key, use an unrecognized algorithm, or name a key
/// whose parameters are unusable are discarded without failing the validation. The signature list
/// is not covered by any signature, so a bad entry must never make a validly signed package
/// unacceptable.
pub fn validate(
    candidate: &RootKeyPackage,
    anchor: TrustAnchor<'_>,
    policy: &TrustPolicy,
) -> Result<Acceptance> {
    if candidate.version() < anchor.version() {
        warn!(
            "Rejecting root key package version {}, which is older than trusted version {}.",
            candidate.version(),
            anchor.version()
        );
        return Err(TrustError::RollbackDetected {
            candidate: candidate.version(),
            current: anchor.version(),
        });
    }

    let eligible = anchor.eligible_keys();
    if eligible.is_empty() {
        warn!("The trust anchor has no eligible root keys.");
        return Err(TrustError::NoTrustAnchor);
    }

    let payload = candidate.canonical_protected_properties();
    let mut signers = BTreeSet::new();

    for sig in candidate.signatures() {
        let kid = sig.signing_key_id();

        let key = match eligible.iter().find(|key| key.kid() == kid) {
            Some(key) => key,
            None => {
                warn!("Discarding signature by '{}', which is not an eligible anchor key.", kid);
                continue;
            }
        };

        let algorithm = match sig.algorithm().parse::<SignatureAlgorithm>() {
            Ok(algorithm) => algorithm,
            Err(_) => {
                warn!("Discarding signature by '{}' with unsupported algorithm '{}'.", kid, sig.algorithm());
                continue;
            }
        };

        if signers.contains(kid) {
            debug!("Ignoring additional signature by '{}'.", kid);
            continue;
        }

        match signature::verify(payload, sig.signature(), key.parameters(), algorithm) {
            Ok(true) => {
                debug!("Valid {} signature by '{}'.", algorithm, kid);
                let _ = signers.insert(kid.to_string());
            }
            Ok(false) => warn!("Discarding invalid {} signature by '{}'.", algorithm, kid),
            Err(e) => warn!("Discarding {} signature by '{}', which cannot be checked: {}", algorithm, kid, e),
        }
    }

    if signers.is_empty() {
        return Err(TrustError::NoValidAnchorSignature);
    }

    let required = policy.quorum.threshold(eligible.len());
    if signers.len() < required {
        warn!(
            "Root key package version {} has {} of {} required signatures.",
            candidate.version(),
            signers.len(),
            required
        );
        return Err(TrustError::QuorumNotMet {
            valid: signers.len(),
            required,
        });
    }

    match (candidate.is_test(), policy.accept_test_packages) {
        (true, false) => return Err(TrustError::TestPackageRejected),
        (false, true) => return Err(TrustError::ProductionPackageRejected),
        _ => {}
    }

    info!(
        "Root key package version {} is trusted, with {} of {} required signatures.",
        candidate.version(),
        signers.len(),
        required
    );

    Ok(Acceptance { signers, required })
}
