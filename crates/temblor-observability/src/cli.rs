// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flag parsing.
//!
//! Supports flags like `--debug-temblor-logictree` to raise the log level
//! of a single crate, `--debug-all` for everything, and the
//! `TEMBLOR_DEBUG` environment variable as a comma-separated crate list.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Which crates have debug logging enabled for this run.
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    enabled: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments.
    ///
    /// Recognizes `--debug-{crate-name}` and `--debug-all`; everything else
    /// is ignored and left for the caller's own argument parsing.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut enabled = BTreeSet::new();
        for arg in args {
            if arg == "--debug-all" {
                enabled.extend(KNOWN_CRATES.iter().map(|s| s.to_string()));
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                enabled.insert(crate_name.to_string());
            }
        }
        CrateDebugFlags { enabled }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled.is_empty()
    }

    /// Filter string for `EnvFilter`, e.g.
    /// `"temblor_logictree=debug,info"`. Targets use underscores, matching
    /// the module paths tracing reports.
    pub fn to_filter_string(&self) -> String {
        if self.enabled.is_empty() {
            return "info".to_string();
        }
        let mut filters: Vec<String> = self
            .enabled
            .iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .collect();
        filters.push("info".to_string());
        filters.join(",")
    }
}

/// Parse debug flags from both the command line and `TEMBLOR_DEBUG`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var("TEMBLOR_DEBUG") {
        if env_var == "all" {
            flags
                .enabled
                .extend(KNOWN_CRATES.iter().map(|s| s.to_string()));
        } else {
            for crate_name in env_var.split(',') {
                let crate_name = crate_name.trim();
                if !crate_name.is_empty() {
                    flags.enabled.insert(crate_name.to_string());
                }
            }
        }
    }
    flags
}
