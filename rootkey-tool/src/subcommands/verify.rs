// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Checks a root key package against the device's current trust state.

use crate::error::Result;
use crate::util::{load_config, open_trust_store};

use rootkey::package::parse::parse;
use rootkey::trust::Acceptance;
use structopt::StructOpt;

/// Models the options required by the verify command.
#[derive(Debug, StructOpt)]
pub struct Verify {
    /// The root key package JSON file to check.
    #[structopt(short = "p", long = "package")]
    package_path: String,

    /// The trust configuration file. If this option is not specified, then it will be obtained
    /// from the `ROOTKEY_CONFIG` environment variable instead.
    #[structopt(short = "c", long = "config")]
    config: Option<String>,
}

impl Verify {
    fn verify(&self) -> Result<Acceptance> {
        let config = load_config(&self.config)?;
        let store = open_trust_store(&config)?;

        println!("Reading package...");
        let text = std::fs::read_to_string(&self.package_path)?;
        let candidate = parse(&text)?;
        println!(
            "    Version {}, {} root keys, {} signatures.",
            candidate.version(),
            candidate.root_keys().len(),
            candidate.signatures().len()
        );

        match store.snapshot() {
            Some(trusted) => println!("Checking against the trusted package (version {})...", trusted.version()),
            None => println!(
                "Checking against {} built-in root keys...",
                store.anchors().keys().len()
            ),
        }

        Ok(store.validate(&candidate)?)
    }

    /// Validates the package, reporting the keys that vouch for it.
    pub fn run(&self) -> Result<()> {
        let acceptance = self.verify()?;
        let signers: Vec<&str> = acceptance.signers.iter().map(|s| s.as_str()).collect();
        println!(
            "The package is trusted. Signed by {} ({} required).",
            signers.join(", "),
            acceptance.required
        );
        Ok(())
    }
}
