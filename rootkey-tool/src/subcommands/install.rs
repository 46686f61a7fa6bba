// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Installs a root key package as the device's trusted package from the given
//! input file.

use crate::error::Result;
use crate::util::{load_config, open_trust_store};

use rootkey::trust::store::UpdateOutcome;
use structopt::StructOpt;

/// Models the options required by the install command.
#[derive(Debug, StructOpt)]
pub struct Install {
    /// The input file, which must be a root key package JSON document.
    #[structopt(short = "p", long = "package")]
    package_path: String,

    /// The trust configuration file. If this option is not specified, then it will be obtained
    /// from the `ROOTKEY_CONFIG` environment variable instead.
    #[structopt(short = "c", long = "config")]
    config: Option<String>,
}

impl Install {
    fn install(&self) -> Result<UpdateOutcome> {
        let config = load_config(&self.config)?;
        let store = open_trust_store(&config)?;
        let text = std::fs::read_to_string(&self.package_path)?;

        println!("Installing to {}...", config.store_path.display());
        Ok(store.update_from_json(&text, &config.package_store())?)
    }

    /// Validates the package and makes it the trusted package on this device.
    pub fn run(&self) -> Result<()> {
        match self.install()? {
            UpdateOutcome::Changed => println!("The package has been installed."),
            UpdateOutcome::Unchanged => println!("The package is already installed."),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::subcommands::testing;
    use rootkey::error::ErrorCode;
    use rootkey::store::PackageStore;

    #[test]
    fn test_install_then_reinstall() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = Install {
            package_path: testing::write_file(dir.path(), "package.json", testing::ROOTKEY_PACKAGE_V1),
            config: Some(testing::write_config(dir.path())),
        };

        assert_eq!(UpdateOutcome::Changed, cmd.install().unwrap());
        let stored = PackageStore::new(testing::store_path(dir.path())).load().unwrap().unwrap();
        assert_eq!(1, stored.version());

        // The stored package is reloaded and found to be identical.
        assert_eq!(UpdateOutcome::Unchanged, cmd.install().unwrap());
    }

    #[test]
    fn test_install_malformed_package() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = Install {
            package_path: testing::write_file(dir.path(), "package.json", "{}"),
            config: Some(testing::write_config(dir.path())),
        };

        match cmd.run().unwrap_err() {
            Error::TrustError(e) => assert_eq!(ErrorCode::BadFormat, e.code()),
            _ => panic!("Unexpected error type."),
        }
        assert!(!testing::store_path(dir.path()).exists());
    }
}
