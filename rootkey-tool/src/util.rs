// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! General-purpose utilities used throughout the rootkey-tool crate.

use crate::error::{Error, Result, ToolErrorKind};

use rootkey::config::TrustConfig;
use rootkey::trust::store::TrustStore;

/// The environment variable that names the trust configuration file, when it is not given on the
/// command-line.
pub const CONFIG_ENV_VAR: &str = "ROOTKEY_CONFIG";

/// Utility to get a string value either from a command-line option or a named environment variable.
pub fn get_config_from_command_or_env(
    config_option: &Option<String>,
    env_var_name: &str,
    purpose: &str,
) -> Result<String> {
    let opt = match config_option {
        Some(o) => o.clone(),
        None => match std::env::var(env_var_name) {
            Ok(env) => env,
            Err(_) => {
                // The option hasn't been specified on the command-line or in the environment variable.
                println!("No {} specified. Please specify on the command-line or by setting the `{}` environment variable.", purpose, env_var_name);
                return Err(Error::ToolError(ToolErrorKind::MissingConfiguration));
            }
        },
    };

    Ok(opt)
}

/// Loads the trust configuration named on the command-line or in `ROOTKEY_CONFIG`.
pub fn load_config(config_option: &Option<String>) -> Result<TrustConfig> {
    let path = get_config_from_command_or_env(config_option, CONFIG_ENV_VAR, "trust configuration file")?;
    Ok(TrustConfig::from_file_path(path)?)
}

/// Builds the device's trust state from the configuration, loading the persisted package if
/// there is one.
pub fn open_trust_store(config: &TrustConfig) -> Result<TrustStore> {
    let anchors = config.builtin_anchors()?;
    Ok(TrustStore::load(&config.package_store(), anchors, config.policy()))
}
