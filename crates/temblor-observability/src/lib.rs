// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

//! # temblor-observability
//!
//! Logging infrastructure for Temblor with per-crate debug flag support.
//!
//! Every binary entry point initializes logging through [`init::init_logging`]
//! so hazard runs emit a consistent, filterable stream regardless of which
//! crates are involved.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Temblor crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "temblor",
    "temblor-logictree",
    "temblor-structures",
];
