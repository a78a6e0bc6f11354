// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Source model logic tree parsing and validation.

The first branching level must hold exactly one branch set of uncertainty
type `sourceModel`; its branches name alternative source model files.
Every referenced file is parsed once (through the caller-supplied
[`SourceModelReader`]) and cached; the ids, tectonic region types, source
kinds and GR MFD counts collected from the parsed models back the filter
and value checks of the deeper branching levels.
*/

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::debug;

use temblor_structures::{SourceKind, SourceModel, SourceModelReader};

use crate::parse::{
    find_logic_tree, parse_strict_float, parse_tree, ParseCtx, RawFilters, TreeBuilder,
    TreeSemantics,
};
use crate::tree::{
    BranchSet, BranchSetId, BranchValue, Filter, LogicTree, UncertaintyType,
};
use crate::types::{LogicTreeError, LtResult};

/// A parsed and validated source model logic tree.
#[derive(Debug)]
pub struct SourceModelLogicTree {
    tree: LogicTree,
    filename: String,
    basepath: PathBuf,
    tectonic_region_types: BTreeSet<String>,
    source_kinds: BTreeSet<SourceKind>,
    gr_mfd_counts: HashMap<String, usize>,
    models: HashMap<PathBuf, SourceModel>,
}

impl SourceModelLogicTree {
    /// Parse `filename` (relative to `basepath`) and validate it as a
    /// source model logic tree. Referenced source model files are resolved
    /// against `basepath` and parsed through `reader`.
    pub fn from_file(
        basepath: &Path,
        filename: &str,
        reader: &dyn SourceModelReader,
    ) -> LtResult<Self> {
        let path = basepath.join(filename);
        let text = fs::read_to_string(&path).map_err(|e| LogicTreeError::Parsing {
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_xml(&text, basepath, filename, reader)
    }

    /// Parse a source model logic tree from an XML string. `basepath` and
    /// `filename` are still needed to resolve referenced source model
    /// files and to attribute errors.
    pub fn from_xml(
        text: &str,
        basepath: &Path,
        filename: &str,
        reader: &dyn SourceModelReader,
    ) -> LtResult<Self> {
        let doc = Document::parse(text).map_err(|e| LogicTreeError::Parsing {
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
            message: e.to_string(),
        })?;
        let ctx = ParseCtx::new(filename, basepath, &doc);
        let tree_node = find_logic_tree(&ctx, &doc)?;
        let mut semantics = SourceModelSemantics {
            reader,
            tectonic_region_types: BTreeSet::new(),
            source_kinds: BTreeSet::new(),
            gr_mfd_counts: HashMap::new(),
            models: HashMap::new(),
        };
        let tree = parse_tree(&ctx, tree_node, &mut semantics)?;
        debug!(
            filename,
            models = semantics.models.len(),
            tectonic_region_types = semantics.tectonic_region_types.len(),
            "validated source model logic tree"
        );
        Ok(SourceModelLogicTree {
            tree,
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
            tectonic_region_types: semantics.tectonic_region_types,
            source_kinds: semantics.source_kinds,
            gr_mfd_counts: semantics.gr_mfd_counts,
            models: semantics.models,
        })
    }

    pub fn tree(&self) -> &LogicTree {
        &self.tree
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn basepath(&self) -> &Path {
        &self.basepath
    }

    /// Tectonic region types used by the referenced source models. The
    /// GMPE logic tree must cover exactly this set.
    pub fn tectonic_region_types(&self) -> &BTreeSet<String> {
        &self.tectonic_region_types
    }

    pub fn source_kinds(&self) -> &BTreeSet<SourceKind> {
        &self.source_kinds
    }

    /// Map from source id to the number of GR MFDs on that source, across
    /// all referenced models.
    pub fn gr_mfd_counts(&self) -> &HashMap<String, usize> {
        &self.gr_mfd_counts
    }

    /// The cached base model parsed from `path`, as referenced by a root
    /// branch value. The base is read-only; realizations clone it.
    pub fn source_model(&self, path: &Path) -> Option<&SourceModel> {
        self.models.get(path)
    }
}

/// Semantic rules of the source model tree variant.
struct SourceModelSemantics<'r> {
    reader: &'r dyn SourceModelReader,
    tectonic_region_types: BTreeSet<String>,
    source_kinds: BTreeSet<SourceKind>,
    gr_mfd_counts: HashMap<String, usize>,
    models: HashMap<PathBuf, SourceModel>,
}

impl SourceModelSemantics<'_> {
    /// Parse a referenced source model file (once) and collect the data
    /// the filter and value checks need.
    fn collect_source_model_data(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        reference: &str,
    ) -> LtResult<PathBuf> {
        let full = ctx.basepath.join(reference);
        if !self.models.contains_key(&full) {
            let model = self
                .reader
                .read(&full)
                .map_err(|e| ctx.parsing_in(reference, e.to_string()))?;
            self.tectonic_region_types
                .extend(model.tectonic_region_types());
            self.source_kinds.extend(model.source_kinds());
            self.gr_mfd_counts.extend(model.gr_mfd_counts());
            self.models.insert(full.clone(), model);
        }
        Ok(full)
    }

    fn parse_absolute_value(
        &self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        branchset: &BranchSet,
        value: &str,
    ) -> LtResult<BranchValue> {
        let source_id = match &branchset.filter {
            Some(Filter::Sources(ids)) if ids.len() == 1 => ids[0].as_str(),
            other => unreachable!(
                "absolute uncertainty validated without single-source filter: {:?}",
                other
            ),
        };
        let num_mfds = self.gr_mfd_counts.get(source_id).copied().unwrap_or(0);
        if num_mfds == 0 {
            return Err(ctx.validation(
                node,
                format!(
                    "source '{}' has no GR MFDs, can't apply absolute uncertainty",
                    source_id
                ),
            ));
        }
        let expected = if branchset.uncertainty_type == UncertaintyType::AbGrAbsolute {
            num_mfds * 2
        } else {
            num_mfds
        };

        let numbers: Option<Vec<f64>> = value.split_whitespace().map(parse_strict_float).collect();
        match numbers {
            Some(values) if values.len() == expected => {
                if branchset.uncertainty_type == UncertaintyType::AbGrAbsolute {
                    let pairs = values.chunks_exact(2).map(|c| (c[0], c[1])).collect();
                    Ok(BranchValue::AbPairs(pairs))
                } else {
                    Ok(BranchValue::MaxMagList(values))
                }
            }
            _ => Err(ctx.validation(
                node,
                format!(
                    "expected list of {} float(s) separated by space, \
                     as source '{}' has {} GR MFD(s)",
                    expected, source_id, num_mfds
                ),
            )),
        }
    }
}

impl TreeSemantics for SourceModelSemantics<'_> {
    fn validate_filters(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        uncertainty_type: UncertaintyType,
        raw: &RawFilters,
    ) -> LtResult<Option<Filter>> {
        if uncertainty_type == UncertaintyType::SourceModel && !raw.is_empty() {
            return Err(ctx.validation(
                node,
                "filters are not allowed on source model uncertainty".to_string(),
            ));
        }
        if raw.len() > 1 {
            return Err(ctx.validation(
                node,
                "only one filter is allowed per branchset".to_string(),
            ));
        }

        let filter = match raw.single() {
            None => None,
            Some(("applyToSources", value)) => {
                let source_ids: Vec<String> =
                    value.split_whitespace().map(str::to_string).collect();
                let mut nonexistent: Vec<&String> = source_ids
                    .iter()
                    .filter(|id| !self.gr_mfd_counts.contains_key(*id))
                    .collect();
                nonexistent.sort();
                if !nonexistent.is_empty() {
                    return Err(ctx.validation(
                        node,
                        format!(
                            "source ids {:?} are not defined in source models",
                            nonexistent
                        ),
                    ));
                }
                Some(Filter::Sources(source_ids))
            }
            Some(("applyToTectonicRegionType", value)) => {
                if !self.tectonic_region_types.contains(value) {
                    return Err(ctx.validation(
                        node,
                        format!(
                            "source models don't define sources of tectonic region type '{}'",
                            value
                        ),
                    ));
                }
                Some(Filter::TectonicRegionType(value.to_string()))
            }
            Some(("applyToSourceType", value)) => {
                let known = value
                    .parse::<SourceKind>()
                    .ok()
                    .filter(|kind| self.source_kinds.contains(kind));
                match known {
                    Some(kind) => Some(Filter::SourceType(kind)),
                    None => {
                        return Err(ctx.validation(
                            node,
                            format!("source models don't define sources of type '{}'", value),
                        ))
                    }
                }
            }
            Some((name, _)) => unreachable!("unknown filter '{}'", name),
        };

        if uncertainty_type.is_absolute() {
            let single_source = matches!(&filter, Some(Filter::Sources(ids)) if ids.len() == 1);
            if !single_source {
                return Err(ctx.validation(
                    node,
                    format!(
                        "uncertainty of type '{}' must define 'applyToSources' \
                         with only one source id",
                        uncertainty_type
                    ),
                ));
            }
        }
        Ok(filter)
    }

    fn validate_branchset(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        depth: usize,
        number: usize,
        branchset: &BranchSet,
    ) -> LtResult<()> {
        if depth == 0 {
            if number > 0 {
                return Err(ctx.validation(
                    node,
                    "there must be only one branch set on first branching level".to_string(),
                ));
            }
            if branchset.uncertainty_type != UncertaintyType::SourceModel {
                return Err(ctx.validation(
                    node,
                    "first branchset must define an uncertainty of type \"sourceModel\""
                        .to_string(),
                ));
            }
        } else {
            if branchset.uncertainty_type == UncertaintyType::SourceModel {
                return Err(ctx.validation(
                    node,
                    "uncertainty of type \"sourceModel\" can be defined on first branchset only"
                        .to_string(),
                ));
            }
            if branchset.uncertainty_type == UncertaintyType::GmpeModel {
                return Err(ctx.validation(
                    node,
                    "uncertainty of type \"gmpeModel\" is not allowed in source model logic tree"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    fn validate_uncertainty_value(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        branchset: &BranchSet,
        value: &str,
    ) -> LtResult<BranchValue> {
        match branchset.uncertainty_type {
            UncertaintyType::SourceModel => {
                let full = self.collect_source_model_data(ctx, value)?;
                Ok(BranchValue::SourceModel(full))
            }
            UncertaintyType::AbGrAbsolute | UncertaintyType::MaxMagGrAbsolute => {
                self.parse_absolute_value(ctx, node, branchset, value)
            }
            UncertaintyType::BGrRelative | UncertaintyType::MaxMagGrRelative => {
                match parse_strict_float(value) {
                    Some(v) => Ok(BranchValue::Single(v)),
                    None => {
                        Err(ctx.validation(node, "expected single float value".to_string()))
                    }
                }
            }
            // rejected by validate_branchset before any branch is parsed
            UncertaintyType::GmpeModel => {
                unreachable!("gmpeModel value reached source model value parsing")
            }
        }
    }

    /// Honor `applyToBranches`: attach this branch set only to the named
    /// branches. They must exist, must come from the immediately preceding
    /// branching level, and must not already have a child branch set.
    fn apply_branchset(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        builder: &mut TreeBuilder,
        branchset: BranchSetId,
    ) -> LtResult<()> {
        let apply_to = match node.attribute("applyToBranches") {
            Some(attr) if !attr.trim().is_empty() => attr,
            _ => {
                builder.attach_to_open_ends(branchset);
                return Ok(());
            }
        };
        for branch_id in apply_to.split_whitespace() {
            let branch_ref = builder.branch_ref(branch_id).ok_or_else(|| {
                ctx.validation(node, format!("branch '{}' is not yet defined", branch_id))
            })?;
            if builder.branch(branch_ref).child_branchset.is_some() {
                return Err(ctx.validation(
                    node,
                    format!("branch '{}' already has child branchset", branch_id),
                ));
            }
            if !builder.is_open_end(branch_ref) {
                return Err(ctx.validation(
                    node,
                    "applyToBranches must reference only branches from previous branching level"
                        .to_string(),
                ));
            }
            builder.set_child(branch_ref, branchset);
        }
        Ok(())
    }
}
