// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # framestream-observability
//!
//! Logging infrastructure shared by the framestream crates and tools, with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known framestream crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "framestream",
    "framestream-config",
    "framestream-observability",
    "framestream-pipeline",
    "framestream-structures",
];
