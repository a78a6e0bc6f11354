// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization.
//!
//! One global subscriber per process, configured from [`LoggingConfig`]
//! plus the per-crate debug flags. Debug flags win over the configured
//! level so a run can be re-executed with more detail without touching
//! its configuration file.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed or the log file cannot be
/// created.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let filter = if debug_flags.any_enabled() {
        debug_flags.to_filter_string()
    } else {
        config.level.clone()
    };
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("invalid log filter '{}'", filter))?;

    let layer = match &config.output {
        LogOutput::Stderr => fmt_layer(config.format, std::io::stderr),
        LogOutput::File(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file: {}", path.display()))?;
            fmt_layer(config.format, Arc::new(file))
        }
    };

    Registry::default()
        .with(layer.with_filter(env_filter))
        .try_init()
        .context("logging already initialized")?;
    Ok(())
}

/// Initialize logging with default settings (text to stderr at info).
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<()> {
    init_logging(debug_flags, &LoggingConfig::default())
}

fn fmt_layer<W>(format: LogFormat, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .json()
            .boxed(),
    }
}
