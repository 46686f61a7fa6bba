// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Reports whether a manifest signing key is disallowed by the trusted package.

use crate::error::Result;
use crate::util::{load_config, open_trust_store};

use rootkey::trust::revocation::SigningKeyRevocation;
use structopt::StructOpt;

/// Models the options required by the query command.
#[derive(Debug, StructOpt)]
pub struct Query {
    /// The hash algorithm of the signing key identity, such as SHA256.
    #[structopt(short = "a", long = "alg")]
    hash_algorithm: String,

    /// The public key hash of the signing key, as base64url without padding.
    #[structopt(long = "hash")]
    hash: String,

    /// The trust configuration file. If this option is not specified, then it will be obtained
    /// from the `ROOTKEY_CONFIG` environment variable instead.
    #[structopt(short = "c", long = "config")]
    config: Option<String>,
}

impl Query {
    fn is_disallowed(&self) -> Result<bool> {
        let hash = base64::decode_config(&self.hash, base64::URL_SAFE_NO_PAD)?;
        let config = load_config(&self.config)?;
        let store = open_trust_store(&config)?;
        if !store.is_initialized() {
            println!("No root key package is trusted yet, so every signing key is disallowed.");
        }
        Ok(store.is_signing_key_disallowed(&self.hash_algorithm, &hash))
    }

    /// Looks up the signing key in the trusted package and prints either `disallowed` or
    /// `allowed`.
    pub fn run(&self) -> Result<()> {
        if self.is_disallowed()? {
            println!("disallowed");
        } else {
            println!("allowed");
        }
        Ok(())
    }
}
