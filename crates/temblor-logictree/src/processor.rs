// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
The logic tree processor: parse, sample, apply.

Ties both trees together for a calculation job. The processor parses the
source model logic tree first, feeds the tectonic region types its models
use into the GMPE tree validation, and then serves any number of
realizations. Each sampling call seeds its own generator from the given
seed, so realizations are reproducible and independent: drawing GMPEs
never disturbs the source model draws and vice versa.

The shared base models stay read-only inside the processor; a realization
receives its own deep copy at [`LogicTreeProcessor::realize_source_model`].
*/

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use temblor_structures::{SourceModel, SourceModelReader};

use crate::apply;
use crate::gmpe::{GmpeLogicTree, GmpeRegistry, GroundMotionModel};
use crate::source_model::SourceModelLogicTree;
use crate::tree::{BranchValue, Filter, UncertaintyType};
use crate::types::LtResult;

/// One non-root uncertainty captured from a sampled path, self-contained
/// so it can be applied to any copy of the chosen source model.
#[derive(Debug, Clone, Serialize)]
pub struct Modification {
    pub uncertainty_type: UncertaintyType,
    pub filter: Option<Filter>,
    pub value: BranchValue,
}

/// The outcome of sampling the source model logic tree once: the chosen
/// source model file plus every uncertainty along the sampled path.
#[derive(Debug, Clone, Serialize)]
pub struct SourceModelRealization {
    pub seed: u64,
    /// Branch ids along the sampled path, root first.
    pub branch_ids: Vec<String>,
    /// Resolved path of the sampled source model file.
    pub source_model_path: PathBuf,
    modifications: Vec<Modification>,
}

impl SourceModelRealization {
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// Apply every sampled uncertainty to `model`, which must be this
    /// realization's private copy of the chosen base model.
    pub fn apply_to(&self, model: &mut SourceModel) {
        for modification in &self.modifications {
            for source in &mut model.sources {
                apply::apply_uncertainty(
                    modification.uncertainty_type,
                    modification.filter.as_ref(),
                    &modification.value,
                    source,
                );
            }
        }
    }
}

/// The outcome of sampling the GMPE logic tree once: one instantiated
/// GMPE per tectonic region type.
#[derive(Debug)]
pub struct GmpeRealization {
    pub seed: u64,
    /// Branch ids along the sampled path, root first.
    pub branch_ids: Vec<String>,
    pub assignments: BTreeMap<String, Box<dyn GroundMotionModel>>,
}

impl GmpeRealization {
    /// Tectonic region type to GMPE name, for serialization.
    pub fn names(&self) -> BTreeMap<&str, &str> {
        self.assignments
            .iter()
            .map(|(trt, gmpe)| (trt.as_str(), gmpe.name()))
            .collect()
    }
}

/// Orchestrates parse, sample and apply for both logic trees.
#[derive(Debug)]
pub struct LogicTreeProcessor {
    source_model_lt: SourceModelLogicTree,
    gmpe_lt: GmpeLogicTree,
}

impl LogicTreeProcessor {
    /// Parse and validate both logic trees. The source model tree is
    /// parsed first; the tectonic region types of its models define the
    /// coverage the GMPE tree must provide.
    pub fn new(
        basepath: &Path,
        source_model_logictree: &str,
        gmpe_logictree: &str,
        reader: &dyn SourceModelReader,
    ) -> LtResult<Self> {
        let source_model_lt = SourceModelLogicTree::from_file(basepath, source_model_logictree, reader)?;
        let gmpe_lt = GmpeLogicTree::from_file(
            source_model_lt.tectonic_region_types(),
            basepath,
            gmpe_logictree,
        )?;
        Ok(LogicTreeProcessor {
            source_model_lt,
            gmpe_lt,
        })
    }

    pub fn source_model_logic_tree(&self) -> &SourceModelLogicTree {
        &self.source_model_lt
    }

    pub fn gmpe_logic_tree(&self) -> &GmpeLogicTree {
        &self.gmpe_lt
    }

    /// Sample one path through the source model logic tree.
    ///
    /// The same seed always yields the same realization. The returned
    /// value carries the chosen source model reference and a
    /// self-contained modification list; nothing is mutated here.
    pub fn sample_source_model(&self, seed: u64) -> SourceModelRealization {
        let mut rnd = StdRng::seed_from_u64(seed);
        let tree = self.source_model_lt.tree();

        let mut branchset = tree.root();
        let mut branch = branchset.sample(&mut rnd);
        let source_model_path = match &branch.value {
            BranchValue::SourceModel(path) => path.clone(),
            other => unreachable!("root branch of source model tree holds {:?}", other),
        };
        let mut branch_ids = vec![branch.branch_id.clone()];
        let mut modifications = Vec::new();
        while let Some(child) = branch.child_branchset {
            branchset = tree.branchset(child);
            branch = branchset.sample(&mut rnd);
            branch_ids.push(branch.branch_id.clone());
            modifications.push(Modification {
                uncertainty_type: branchset.uncertainty_type,
                filter: branchset.filter.clone(),
                value: branch.value.clone(),
            });
        }

        info!(
            seed,
            path = ?branch_ids,
            source_model = %source_model_path.display(),
            "sampled source model logic tree"
        );
        SourceModelRealization {
            seed,
            branch_ids,
            source_model_path,
            modifications,
        }
    }

    /// Sample the source model logic tree and produce a concrete source
    /// model: a deep copy of the sampled base model with every sampled
    /// uncertainty applied. The shared base model is left untouched.
    pub fn realize_source_model(&self, seed: u64) -> (SourceModelRealization, SourceModel) {
        let realization = self.sample_source_model(seed);
        let mut model = self
            .source_model_lt
            .source_model(&realization.source_model_path)
            .expect("sampled source model missing from parse cache")
            .clone();
        realization.apply_to(&mut model);
        (realization, model)
    }

    /// Sample one path through the GMPE logic tree, instantiating one
    /// GMPE per tectonic region type. Uses a generator seeded
    /// independently of the source model sampling.
    pub fn sample_gmpe(&self, seed: u64) -> GmpeRealization {
        let mut rnd = StdRng::seed_from_u64(seed);
        let tree = self.gmpe_lt.tree();

        let mut branch_ids = Vec::new();
        let mut assignments: BTreeMap<String, Box<dyn GroundMotionModel>> = BTreeMap::new();
        let mut next = Some(tree.root());
        while let Some(branchset) = next {
            let branch = branchset.sample(&mut rnd);
            branch_ids.push(branch.branch_id.clone());
            let trt = match &branchset.filter {
                Some(Filter::TectonicRegionType(trt)) => trt.clone(),
                other => unreachable!("gmpe branchset filter is {:?}", other),
            };
            let name = match &branch.value {
                BranchValue::Gmpe(name) => name,
                other => unreachable!("gmpe branch holds {:?}", other),
            };
            let gmpe = GmpeRegistry::instantiate(name)
                .expect("validated gmpe name missing from registry");
            debug_assert!(!assignments.contains_key(&trt));
            assignments.insert(trt, gmpe);
            next = branch.child_branchset.map(|id| tree.branchset(id));
        }

        debug!(seed, gmpes = assignments.len(), "sampled GMPE logic tree");
        GmpeRealization {
            seed,
            branch_ids,
            assignments,
        }
    }
}
