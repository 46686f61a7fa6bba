// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! The process-wide trust state.
//!
//! A [TrustStore] holds the currently trusted package behind an `Arc`. Readers take a snapshot
//! of the handle and then work on an immutable package without holding any lock, so a reader sees
//! either the old package or the new one in full. Writers are serialized by a separate mutex, and
//! validate the candidate before taking the write lock only for the swap itself.
//!
//! The store starts out `Uninitialized`, trusting only its built-in anchors, and moves to
//! `Trusted(package)` when a package is loaded from disk or installed. It never goes back.

use super::error::TrustError;
use super::revocation::SigningKeyRevocation;
use super::{validate, Acceptance, BuiltinAnchors, Result, TrustAnchor, TrustPolicy};
use crate::error::ErrorCode;
use crate::keys::RootKey;
use crate::package::parse::parse;
use crate::package::{DisabledSigningKey, RootKeyPackage};
use crate::store::PackageStore;

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// The result of a successful update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The candidate is identical to the trusted package, so nothing was done.
    Unchanged,
    /// The candidate is now the trusted package.
    Changed,
}

/// Holder of the currently trusted root key package.
#[derive(Debug)]
pub struct TrustStore {
    anchors: BuiltinAnchors,
    policy: TrustPolicy,
    current: RwLock<Option<Arc<RootKeyPackage>>>,
    update_lock: Mutex<()>,
    last_update_code: Mutex<Option<ErrorCode>>,
}

impl TrustStore {
    /// Creates a store that trusts only its built-in anchors.
    pub fn new(anchors: BuiltinAnchors, policy: TrustPolicy) -> TrustStore {
        TrustStore {
            anchors,
            policy,
            current: RwLock::new(None),
            update_lock: Mutex::new(()),
            last_update_code: Mutex::new(None),
        }
    }

    /// Creates a store from the package persisted in `package_store`.
    ///
    /// The persisted package is checked again before it is trusted, so that editing the file
    /// cannot introduce keys. It is trusted if the built-in anchors vouch for it, or if a quorum
    /// of its own active root keys signed it. The second case covers a device whose trust has
    /// been rotated away from its built-in keys: the package was accepted through a chain of
    /// updates that is no longer on disk, and it stays the last-known-good anchor, with its
    /// version and its revocations, across restarts. If there is no persisted package, or it
    /// cannot be read or validated, the store is left trusting only its built-in anchors.
    pub fn load(package_store: &PackageStore, anchors: BuiltinAnchors, policy: TrustPolicy) -> TrustStore {
        let store = TrustStore::new(anchors, policy);

        let package = match package_store.load() {
            Ok(Some(package)) => package,
            Ok(None) => return store,
            Err(e) => {
                error!("Failed to load the stored root key package: {}", e);
                store.set_last_update_code(Some(e.code()));
                return store;
            }
        };

        let accepted = validate(&package, TrustAnchor::Builtin(&store.anchors), &store.policy).or_else(|e| {
            debug!("The built-in anchors do not vouch for the stored root key package: {}", e);
            validate(&package, TrustAnchor::Package(&package), &store.policy).map_err(|_| e)
        });

        match accepted {
            Ok(_) => {
                info!("Loaded trusted root key package version {}.", package.version());
                store.swap(package);
            }
            Err(e) => {
                error!("The stored root key package is not trusted: {}", e);
                store.set_last_update_code(Some(e.code()));
            }
        }

        store
    }

    /// Gets a handle to the currently trusted package, or `None` if no package has been
    /// accepted.
    pub fn snapshot(&self) -> Option<Arc<RootKeyPackage>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn anchors(&self) -> &BuiltinAnchors {
        &self.anchors
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Validates a candidate against the current trust anchor, without changing any state.
    pub fn validate(&self, candidate: &RootKeyPackage) -> Result<Acceptance> {
        let current = self.snapshot();
        validate(candidate, self.anchor(&current), &self.policy)
    }

    /// Validates a candidate and, if it is accepted, makes it the trusted package. On failure the
    /// previously trusted package stays in force.
    pub fn replace(&self, candidate: RootKeyPackage) -> Result<UpdateOutcome> {
        let result = self.install(candidate, None);
        self.record(&result);
        result
    }

    /// Parses, validates, persists and then trusts a package. The package is only trusted once it
    /// has been written to `package_store`.
    pub fn update_from_json(&self, json: &str, package_store: &PackageStore) -> Result<UpdateOutcome> {
        let result = parse(json)
            .map_err(TrustError::from)
            .and_then(|candidate| self.install(candidate, Some(package_store)));
        self.record(&result);
        result
    }

    /// Finds a root key that may currently be used, by id.
    ///
    /// Built-in anchor keys are found first, unless the trusted package disables them. Otherwise
    /// the key must be an active root key of the trusted package.
    pub fn key_for_kid(&self, kid: &str) -> Option<RootKey> {
        let current = self.snapshot();
        if let Some(package) = &current {
            if package.is_root_key_disabled(kid) {
                return None;
            }
        }

        if let Some(key) = self.anchors.key_for_kid(kid) {
            return Some(key.clone());
        }

        current.and_then(|package| package.key_for_kid(kid).cloned())
    }

    /// The disabled signing keys of the trusted package.
    pub fn disabled_signing_keys(&self) -> Vec<DisabledSigningKey> {
        match self.snapshot() {
            Some(package) => package.disabled_signing_keys().iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// The result code of the last failed update, or `None` if the last update succeeded.
    pub fn last_update_code(&self) -> Option<ErrorCode> {
        *self
            .last_update_code
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn anchor<'a>(&'a self, current: &'a Option<Arc<RootKeyPackage>>) -> TrustAnchor<'a> {
        match current {
            Some(package) => TrustAnchor::Package(&**package),
            None => TrustAnchor::Builtin(&self.anchors),
        }
    }

    fn install(&self, candidate: RootKeyPackage, package_store: Option<&PackageStore>) -> Result<UpdateOutcome> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Writers are serialized, so the trusted package cannot change until the guard is
        // dropped.
        let current = self.snapshot();
        if let Err(e) = validate(&candidate, self.anchor(&current), &self.policy) {
            warn!("Rejected root key package version {}: {}", candidate.version(), e);
            return Err(e);
        }

        if let Some(package) = &current {
            if **package == candidate {
                info!("Root key package version {} is already trusted.", candidate.version());
                return Ok(UpdateOutcome::Unchanged);
            }
        }

        if let Some(package_store) = package_store {
            package_store.save(&candidate)?;
        }

        info!("Trusting root key package version {}.", candidate.version());
        self.swap(candidate);
        Ok(UpdateOutcome::Changed)
    }

    fn swap(&self, package: RootKeyPackage) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Arc::new(package));
    }

    fn record(&self, result: &Result<UpdateOutcome>) {
        let code = result.as_ref().err().map(TrustError::code);
        self.set_last_update_code(code);
    }

    fn set_last_update_code(&self, code: Option<ErrorCode>) {
        *self
            .last_update_code
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = code;
    }
}

impl SigningKeyRevocation for TrustStore {
    /// Answers against the trusted package. Until a package has been trusted there is no
    /// revocation list to consult, and every signing key is reported as disallowed.
    fn is_signing_key_disallowed(&self, hash_algorithm: &str, public_key_hash: &[u8]) -> bool {
        match self.snapshot() {
            Some(package) => package.is_signing_key_disallowed(hash_algorithm, public_key_hash),
            None => true,
        }
    }
}
