// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! Common definitions for the command-line application.

/// The name of the tool.
pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// A short description of what the tool does.
pub const PROJECT_DESC: &str = env!("CARGO_PKG_DESCRIPTION");

pub const PROJECT_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");
