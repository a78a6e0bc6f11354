// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
# Temblor Source Model Structures

Value types for seismic source models consumed by the logic tree engine:

- Magnitude-frequency distributions (truncated Gutenberg-Richter and
  evenly discretized)
- Seismic sources (point, area, simple fault, complex fault)
- The `SourceModel` aggregate with the lookups the logic tree validator
  needs (source ids, tectonic region types, source kinds, GR MFD counts)
- A `SourceModelReader` trait plus an NRML-style XML implementation

`SourceModel` is a plain `Clone`-able value type: the logic tree engine
parses a base model once and derives each realization from a private deep
copy, so nothing here carries interior mutability.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod mfd;
pub mod nrml;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use mfd::{EvenlyDiscretizedMfd, Mfd, TruncatedGrMfd};
pub use nrml::{parse_source_model, NrmlSourceModelReader, SourceModelReader};
pub use source::{Source, SourceKind, SourceModel};
pub use types::{ModelError, ModelResult};
