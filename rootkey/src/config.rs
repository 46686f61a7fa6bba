// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Device configuration for the trust engine.
//!
//! The configuration is a JSON document such as:
//!
//! `````json
//! {
//!     "quorum": { "at-least": 1 },
//!     "store-path": "/var/lib/adu/rootkeystore/rootkeys.json",
//!     "accept-test-packages": false,
//!     "anchors": [
//!         { "kid": "ADU.200702.R", "keyType": "RSA", "n": "<modulus>", "e": "AQAB" }
//!     ]
//! }
//! `````
//!
//! Every member is optional. Anchors use the same shape, and the same decoding rules, as the
//! `rootKeys` entries of a package.

use crate::keys::RootKey;
use crate::package::parse::root_key_from_fields;
use crate::store::{PackageStore, DEFAULT_STORE_PATH};
use crate::trust::{BuiltinAnchors, QuorumPolicy, TrustPolicy};

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// The configuration document is not valid JSON, or has members of the wrong type.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// One of the configured anchors is not a usable root key.
    #[error("Invalid trust anchor '{kid}': {source}")]
    InvalidAnchor {
        kid: String,
        source: crate::package::error::Error,
    },

    /// Two configured anchors share a key id.
    #[error("The trust anchor '{0}' is configured more than once.")]
    DuplicateAnchor(String),
}

/// A built-in trust anchor, in the shape of a `rootKeys` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorKey {
    pub kid: String,
    #[serde(rename = "keyType")]
    pub key_type: String,
    pub n: Option<String>,
    pub e: Option<String>,
}

impl AnchorKey {
    pub fn to_root_key(&self) -> Result<RootKey, ConfigError> {
        root_key_from_fields(&self.kid, &self.key_type, self.n.as_deref(), self.e.as_deref()).map_err(
            |source| ConfigError::InvalidAnchor {
                kid: self.kid.clone(),
                source,
            },
        )
    }
}

/// Trust engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrustConfig {
    pub quorum: QuorumPolicy,
    pub store_path: PathBuf,
    pub anchors: Vec<AnchorKey>,
    pub accept_test_packages: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        TrustConfig {
            quorum: QuorumPolicy::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            anchors: Vec::new(),
            accept_test_packages: false,
        }
    }
}

impl TrustConfig {
    /// Reads the configuration from a JSON file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<TrustConfig, ConfigError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn policy(&self) -> TrustPolicy {
        TrustPolicy {
            quorum: self.quorum,
            accept_test_packages: self.accept_test_packages,
        }
    }

    /// Builds the configured anchors. Any anchor that is not a usable root key, or that repeats
    /// the id of another anchor, fails the whole configuration.
    pub fn builtin_anchors(&self) -> Result<BuiltinAnchors, ConfigError> {
        let mut keys: Vec<RootKey> = Vec::with_capacity(self.anchors.len());
        for anchor in &self.anchors {
            if keys.iter().any(|key| key.kid() == anchor.kid) {
                return Err(ConfigError::DuplicateAnchor(anchor.kid.clone()));
            }
            keys.push(anchor.to_root_key()?);
        }
        Ok(BuiltinAnchors::new(keys))
    }

    pub fn package_store(&self) -> PackageStore {
        PackageStore::new(&self.store_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;
    use crate::keys::KeyParameters;
    use crate::testing;
    use serde_json::json;

    fn anchor_json(kid: &str) -> serde_json::Value {
        let key = testing::k1().root_key().unwrap();
        match key.parameters() {
            KeyParameters::Rsa(rsa) => json!({
                "kid": kid,
                "keyType": "RSA",
                "n": encoding::encode_base64url(rsa.modulus()),
                "e": encoding::encode_base64url(rsa.exponent()),
            }),
        }
    }

    #[test]
    fn test_defaults() {
        let config: TrustConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(TrustConfig::default(), config);
        assert_eq!(QuorumPolicy::AtLeast(1), config.quorum);
        assert_eq!(Path::new(DEFAULT_STORE_PATH), config.package_store().path());
        assert!(!config.policy().accept_test_packages);
        assert!(config.builtin_anchors().unwrap().keys().is_empty());
    }

    #[test]
    fn test_from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rootkey.json");
        let document = json!({
            "quorum": "majority",
            "store-path": dir.path().join("rootkeys.json"),
            "accept-test-packages": true,
            "anchors": [anchor_json("ADU.200702.R")],
        });
        std::fs::write(&path, document.to_string()).unwrap();

        let config = TrustConfig::from_file_path(&path).unwrap();
        assert_eq!(QuorumPolicy::Majority, config.quorum);
        assert!(config.policy().accept_test_packages);
        assert_eq!(dir.path().join("rootkeys.json"), config.package_store().path());

        let anchors = config.builtin_anchors().unwrap();
        assert_eq!(1, anchors.keys().len());
        assert_eq!(
            testing::root_key_from_pem("ADU.200702.R", testing::K1_PEM),
            anchors.keys()[0]
        );
    }

    #[test]
    fn test_invalid_anchor() {
        let mut anchor = anchor_json("ADU.BAD.R");
        anchor["n"] = json!("AAAA=");
        let config: TrustConfig = serde_json::from_value(json!({ "anchors": [anchor] })).unwrap();

        match config.builtin_anchors().unwrap_err() {
            ConfigError::InvalidAnchor { kid, .. } => assert_eq!("ADU.BAD.R", kid),
            _ => panic!("Unexpected error type."),
        }
    }

    #[test]
    fn test_duplicate_anchor() {
        let config: TrustConfig = serde_json::from_value(json!({
            "anchors": [anchor_json("ADU.200702.R"), anchor_json("ADU.200702.R")]
        }))
        .unwrap();

        match config.builtin_anchors().unwrap_err() {
            ConfigError::DuplicateAnchor(kid) => assert_eq!("ADU.200702.R", kid),
            _ => panic!("Unexpected error type."),
        }
    }

    #[test]
    fn test_unsupported_anchor_key_type() {
        let config: TrustConfig = serde_json::from_value(json!({
            "anchors": [{ "kid": "EC.1", "keyType": "EC" }]
        }))
        .unwrap();
        assert!(config.builtin_anchors().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match TrustConfig::from_file_path(dir.path().join("missing.json")).unwrap_err() {
            ConfigError::IoError(_) => {}
            _ => panic!("Unexpected error type."),
        }
    }

    #[test]
    fn test_bad_quorum() {
        let result: serde_json::Result<TrustConfig> = serde_json::from_str(r#"{"quorum": "most"}"#);
        assert!(result.is_err());
    }
}
