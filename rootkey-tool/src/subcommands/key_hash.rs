// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Computes the identity of a manifest signing key from its JWK payload, and writes it to the
//! console as the hash algorithm and the base64url public key hash.

use crate::error::Result;

use rootkey::keys::signing::alg_and_hash_from_signing_key_payload;
use structopt::StructOpt;

/// Models the options required by the key-hash command.
#[derive(Debug, StructOpt)]
pub struct KeyHash {
    /// A file containing the signing key payload, as a JWK-shaped JSON object.
    #[structopt(short = "p", long = "payload")]
    payload_path: String,
}

impl KeyHash {
    fn identity(&self) -> Result<String> {
        let payload = std::fs::read_to_string(&self.payload_path)?;
        let identity = alg_and_hash_from_signing_key_payload(&payload)?;
        Ok(format!(
            "{} {}",
            identity.hash_algorithm,
            base64::encode_config(&identity.public_key_hash, base64::URL_SAFE_NO_PAD)
        ))
    }

    /// Prints the identity with no additional verbosity, so that it can be copied into the
    /// `disabledSigningKeys` of a package by scripts.
    pub fn run(&self) -> Result<()> {
        println!("{}", self.identity()?);
        Ok(())
    }
}
