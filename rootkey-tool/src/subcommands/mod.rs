// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Subcommand implementations.

mod install;
mod key_hash;
mod query;
mod sign;
mod verify;

use crate::error::Result;
use crate::subcommands::install::Install;
use crate::subcommands::key_hash::KeyHash;
use crate::subcommands::query::Query;
use crate::subcommands::sign::Sign;
use crate::subcommands::verify::Verify;

use structopt::StructOpt;

/// Command-line interface to rootkey-tool operations.
#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Checks whether a root key package would be trusted by this device, without installing it.
    Verify(Verify),

    /// Validates a root key package and, if it is trusted, persists it as the device's trusted
    /// package.
    Install(Install),

    /// Reports whether a manifest signing key, identified by hash algorithm and public key hash,
    /// is disallowed by the trusted package.
    Query(Query),

    /// Computes the identity (hash algorithm and public key hash) of a manifest signing key from
    /// its JWK payload, in the form used by `disabledSigningKeys`.
    KeyHash(KeyHash),

    /// Adds a signature to a root key package using a local private key, and writes the signed
    /// package to standard output.
    Sign(Sign),
}

impl Subcommand {
    /// Runs the command.
    pub fn run(&self) -> Result<()> {
        match &self {
            Subcommand::Verify(cmd) => cmd.run(),
            Subcommand::Install(cmd) => cmd.run(),
            Subcommand::Query(cmd) => cmd.run(),
            Subcommand::KeyHash(cmd) => cmd.run(),
            Subcommand::Sign(cmd) => cmd.run(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};

    pub const K1_PEM: &str = include_str!("../../../rootkey/testdata/k1.pem");
    pub const K2_PEM: &str = include_str!("../../../rootkey/testdata/k2.pem");
    pub const ROOTKEY_PACKAGE_V1: &str = include_str!("../../../rootkey/testdata/rootkeypackage_v1.json");
    pub const SIGNING_KEY_JWK: &str = include_str!("../../../rootkey/testdata/signing_key_jwk.json");
    pub const K3_SPKI_SHA256: &str = "0lEaVNIsSEOyphGidOxooeb5tsgFTrXVs7htj_0yfwU";

    /// Writes `contents` to a file in `dir`, returning its path as a string.
    pub fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Writes a trust configuration whose only anchor is the root key of the fixture package,
    /// storing the trusted package under `dir`.
    pub fn write_config(dir: &Path) -> String {
        let fixture: Value = serde_json::from_str(ROOTKEY_PACKAGE_V1).unwrap();
        let config = json!({
            "store-path": store_path(dir),
            "anchors": [fixture["protectedProperties"]["rootKeys"][0].clone()],
        });
        write_file(dir, "rootkey.json", &config.to_string())
    }

    pub fn store_path(dir: &Path) -> PathBuf {
        dir.join("rootkeystore").join("rootkeys.json")
    }
}
