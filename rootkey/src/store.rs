// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Persistence of the trusted root key package, so that trust survives a restart.
//!
//! The package is stored as the same JSON document that it was parsed from. Writes go to a
//! temporary file next to the destination, which is then renamed over it, so a reader of the
//! store never sees a partially written package.

use crate::package::parse::parse;
use crate::package::{Result, RootKeyPackage};

use log::{debug, error, info};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where the agent keeps the trusted package unless configured otherwise.
pub const DEFAULT_STORE_PATH: &str = "/var/lib/adu/rootkeystore/rootkeys.json";

/// A location on disk for the trusted root key package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageStore {
    path: PathBuf,
}

impl PackageStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> PackageStore {
        PackageStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the stored package. Returns `Ok(None)` if nothing has been stored yet.
    ///
    /// The package is only parsed here, not validated.
    pub fn load(&self) -> Result<Option<RootKeyPackage>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No root key package is stored at {}.", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let package = parse(&text)?;
        Ok(Some(package))
    }

    /// Writes the package to the store, replacing any package that was there before.
    pub fn save(&self, package: &RootKeyPackage) -> Result<()> {
        let text = package.to_json_string()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        match write_then_rename(&temp_path, &self.path, text.as_bytes()) {
            Ok(()) => {
                debug!(
                    "Stored root key package version {} at {}.",
                    package.version(),
                    self.path.display()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to store the root key package at {}: {}", self.path.display(), e);
                if temp_path.exists() {
                    if let Err(remove_error) = fs::remove_file(&temp_path) {
                        info!("Failed to remove {}: {}", temp_path.display(), remove_error);
                    }
                }
                Err(e.into())
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push("-temp");
        PathBuf::from(name)
    }
}

impl Default for PackageStore {
    fn default() -> Self {
        PackageStore::new(DEFAULT_STORE_PATH)
    }
}

fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}
