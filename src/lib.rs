//! # Temblor - Probabilistic Seismic Hazard Logic Tree Engine
//!
//! Temblor parses, validates and samples the two logic trees of a
//! probabilistic seismic hazard calculation:
//!
//! - the **source model logic tree**, which chooses a base seismic source
//!   model and layers Gutenberg-Richter parameter uncertainties on top of
//!   it;
//! - the **GMPE logic tree**, which assigns one ground motion prediction
//!   equation per tectonic region type.
//!
//! Both trees are validated exhaustively when loaded; sampling then never
//! fails. Realizations are drawn with explicit seeds, so every draw is
//! reproducible and independent workers can sample concurrently against
//! the same shared, read-only trees.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! temblor = "0.1"
//! ```
//!
//! ```rust,no_run
//! use std::path::Path;
//! use temblor::prelude::*;
//!
//! let reader = NrmlSourceModelReader;
//! let processor = LogicTreeProcessor::new(
//!     Path::new("demos/job"),
//!     "source_model_logic_tree.xml",
//!     "gmpe_logic_tree.xml",
//!     &reader,
//! )?;
//!
//! // one source model realization and its concrete source model
//! let (realization, model) = processor.realize_source_model(42);
//! println!("path: {:?}", realization.branch_ids);
//! println!("sources: {}", model.len());
//!
//! // one GMPE per tectonic region type, from an independent seed
//! let gmpes = processor.sample_gmpe(42);
//! for (trt, gmpe) in gmpes.names() {
//!     println!("{} -> {}", trt, gmpe);
//! }
//! # Ok::<(), temblor::logictree::LogicTreeError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: temblor-structures                         │
//! │  (source models, MFDs, NRML reading)                    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Core: temblor-logictree                                │
//! │  (parsing, validation, sampling, uncertainty            │
//! │   application, GMPE registry)                           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: temblor-observability                  │
//! │  (logging initialization, debug flags)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use temblor_structures as structures;

// Re-export core
pub use temblor_logictree as logictree;

// Re-export infrastructure
pub use temblor_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::logictree::{
        BranchValue, Filter, GmpeLogicTree, GmpeRealization, GmpeRegistry, LogicTree,
        LogicTreeError, LogicTreeProcessor, SourceModelLogicTree, SourceModelRealization,
        UncertaintyType,
    };
    pub use crate::structures::{
        Mfd, NrmlSourceModelReader, Source, SourceKind, SourceModel, SourceModelReader,
    };
}
