// Copyright 2021 Contributors to the Confidential Packaging project.
// SPDX-License-Identifier: MIT

//! The rootkey-tool crate provides an operator and diagnostic command-line surface over the
//! `rootkey` crate: checking a root key package against a device's trust state, installing it,
//! signing it, and querying signing key revocation.

pub mod cli;
pub mod common;
pub mod error;
pub mod subcommands;
pub mod util;
