// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
# Temblor Logic Tree Engine

Parsing, validation and seeded Monte Carlo sampling of seismic hazard
logic trees.

Two tree variants share one grammar and one parse pipeline:

- the **source model logic tree** chooses a base source model file at the
  root and layers Gutenberg-Richter parameter uncertainties below it;
- the **GMPE logic tree** assigns one ground motion prediction equation
  per tectonic region type.

Both are validated exhaustively at parse time, so sampling and
application never fail: a [`tree::LogicTree`] that exists is correct by
construction. The [`processor::LogicTreeProcessor`] is the front door for
calculation jobs, producing reproducible realizations from explicit
seeds.
*/

pub mod apply;
pub mod gmpe;
pub mod parse;
pub mod processor;
pub mod source_model;
pub mod tree;
pub mod types;

pub use gmpe::{GmpeLogicTree, GmpeRegistry, GroundMotionModel};
pub use processor::{GmpeRealization, LogicTreeProcessor, Modification, SourceModelRealization};
pub use source_model::SourceModelLogicTree;
pub use tree::{
    Branch, BranchSet, BranchSetId, BranchValue, Filter, LogicTree, UncertaintyType, UniformSource,
};
pub use types::{LogicTreeError, LtResult};

/// Crate version, taken from the manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
