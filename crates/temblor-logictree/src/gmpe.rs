// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
GMPE logic tree parsing, validation and the GMPE registry.

A GMPE logic tree assigns one ground motion prediction equation per
tectonic region type. Its shape is deliberately rigid: every branch set
carries uncertainty type `gmpeModel`, every branching level holds exactly
one branch set, every branch set filters on exactly one tectonic region
type, and the set of filtered region types must match the set used by the
source models exactly - no region left uncovered, none invented.

The registry resolves the GMPE names appearing as branch values into
instantiable implementations; names are checked at validation time and
instantiated at sampling time.
*/

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::debug;

use crate::parse::{find_logic_tree, parse_tree, ParseCtx, RawFilters, TreeSemantics};
use crate::tree::{BranchSet, BranchValue, Filter, LogicTree, UncertaintyType};
use crate::types::{LogicTreeError, LtResult};

/// A ground motion prediction equation implementation.
///
/// The hazard computation surface is out of scope here; the logic tree
/// engine only needs registry-resolvable, instantiable values.
pub trait GroundMotionModel: fmt::Debug + Send + Sync {
    /// The registry name, as it appears in logic tree documents.
    fn name(&self) -> &'static str;
}

macro_rules! declare_gmpes {
    ($($type_name:ident => $registry_name:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $type_name;

            impl GroundMotionModel for $type_name {
                fn name(&self) -> &'static str {
                    $registry_name
                }
            }
        )*

        const GMPE_CONSTRUCTORS: &[(&str, fn() -> Box<dyn GroundMotionModel>)] = &[
            $(($registry_name, || Box::new($type_name))),*
        ];
    };
}

declare_gmpes! {
    Abrahamson2000 => "Abrahamson_2000_AttenRel",
    AbrahamsonSilva1997 => "AS_1997_AttenRel",
    AbrahamsonSilva2008 => "AS_2008_AttenRel",
    AtkinsonWald2010 => "AW_2010_AttenRel",
    BooreAtkinson2008 => "BA_2008_AttenRel",
    BergeThierryEtAl2004 => "BC_2004_AttenRel",
    BooreJoynerFumal1997 => "BJF_1997_AttenRel",
    BommerStafford2003 => "BS_2003_AttenRel",
    BooreEtAl1997 => "BW_1997_AttenRel",
    Campbell1997 => "Campbell_1997_AttenRel",
    CampbellBozorgnia2003 => "CB_2003_AttenRel",
    CampbellBozorgnia2008 => "CB_2008_AttenRel",
    ChenLiu2002 => "CL_2002_AttenRel",
    CauzziFaccioli2005 => "CS_2005_AttenRel",
    ChiouYoungs2008 => "CY_2008_AttenRel",
    DahleEtAl1995 => "DahleEtAl_1995_AttenRel",
    Field2000 => "Field_2000_AttenRel",
    GouletEtAl2006 => "GouletEtAl_2006_AttenRel",
    McVerryEtAl2000 => "McVerryetal_2000_AttenRel",
    SadighEtAl1997 => "SadighEtAl_1997_AttenRel",
    SpudichEtAl1999 => "SEA_1999_AttenRel",
    WellsCoppersmith1994 => "WC94_DisplMagRel",
}

/// Name-keyed registry of the available GMPE implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmpeRegistry;

impl GmpeRegistry {
    pub fn contains(name: &str) -> bool {
        GMPE_CONSTRUCTORS.iter().any(|(n, _)| *n == name)
    }

    /// Instantiate the GMPE registered under `name`.
    pub fn instantiate(name: &str) -> Option<Box<dyn GroundMotionModel>> {
        GMPE_CONSTRUCTORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, make)| make())
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        GMPE_CONSTRUCTORS.iter().map(|(n, _)| *n)
    }
}

/// A parsed and validated GMPE logic tree.
#[derive(Debug)]
pub struct GmpeLogicTree {
    tree: LogicTree,
    filename: String,
    basepath: PathBuf,
}

impl GmpeLogicTree {
    /// Parse `filename` (relative to `basepath`) and validate it as a GMPE
    /// logic tree covering exactly `tectonic_region_types` (the set used
    /// by the source models).
    pub fn from_file(
        tectonic_region_types: &BTreeSet<String>,
        basepath: &Path,
        filename: &str,
    ) -> LtResult<Self> {
        let path = basepath.join(filename);
        let text = fs::read_to_string(&path).map_err(|e| LogicTreeError::Parsing {
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_xml(&text, tectonic_region_types, basepath, filename)
    }

    /// Parse a GMPE logic tree from an XML string.
    pub fn from_xml(
        text: &str,
        tectonic_region_types: &BTreeSet<String>,
        basepath: &Path,
        filename: &str,
    ) -> LtResult<Self> {
        let doc = Document::parse(text).map_err(|e| LogicTreeError::Parsing {
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
            message: e.to_string(),
        })?;
        let ctx = ParseCtx::new(filename, basepath, &doc);
        let tree_node = find_logic_tree(&ctx, &doc)?;
        let mut semantics = GmpeSemantics {
            tectonic_region_types,
            defined_tectonic_region_types: BTreeSet::new(),
        };
        let tree = parse_tree(&ctx, tree_node, &mut semantics)?;
        debug!(
            filename,
            tectonic_region_types = semantics.defined_tectonic_region_types.len(),
            "validated GMPE logic tree"
        );
        Ok(GmpeLogicTree {
            tree,
            filename: filename.to_string(),
            basepath: basepath.to_path_buf(),
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
}

/// Semantic rules of the GMPE tree variant.
struct GmpeSemantics<'a> {
    tectonic_region_types: &'a BTreeSet<String>,
    defined_tectonic_region_types: BTreeSet<String>,
}

impl TreeSemantics for GmpeSemantics<'_> {
    fn validate_filters(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        _uncertainty_type: UncertaintyType,
        raw: &RawFilters,
    ) -> LtResult<Option<Filter>> {
        let trt = match raw.single() {
            Some(("applyToTectonicRegionType", value)) => value,
            _ => {
                return Err(ctx.validation(
                    node,
                    "branch sets in gmpe logic tree must define only \
                     \"applyToTectonicRegionType\" filter"
                        .to_string(),
                ))
            }
        };
        if !self.tectonic_region_types.contains(trt) {
            return Err(ctx.validation(
                node,
                format!(
                    "source models don't define sources of tectonic region type '{}'",
                    trt
                ),
            ));
        }
        if !self.defined_tectonic_region_types.insert(trt.to_string()) {
            return Err(ctx.validation(
                node,
                format!(
                    "gmpe uncertainty for tectonic region type '{}' has already been defined",
                    trt
                ),
            ));
        }
        Ok(Some(Filter::TectonicRegionType(trt.to_string())))
    }

    fn validate_branchset(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        _depth: usize,
        number: usize,
        branchset: &BranchSet,
    ) -> LtResult<()> {
        if branchset.uncertainty_type != UncertaintyType::GmpeModel {
            return Err(ctx.validation(
                node,
                "only uncertainties of type \"gmpeModel\" are allowed in gmpe logic tree"
                    .to_string(),
            ));
        }
        if number != 0 {
            return Err(ctx.validation(
                node,
                "only one branchset on each branching level is allowed in gmpe logic tree"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn validate_uncertainty_value(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        _branchset: &BranchSet,
        value: &str,
    ) -> LtResult<BranchValue> {
        if !GmpeRegistry::contains(value) {
            return Err(ctx.validation(node, format!("gmpe '{}' is not available", value)));
        }
        Ok(BranchValue::Gmpe(value.to_string()))
    }

    fn validate_tree(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        _tree: &LogicTree,
    ) -> LtResult<()> {
        let missing: Vec<&String> = self
            .tectonic_region_types
            .difference(&self.defined_tectonic_region_types)
            .collect();
        if !missing.is_empty() {
            return Err(ctx.validation(
                node,
                format!(
                    "the following tectonic region types are defined in source \
                     model logic tree but not in gmpe logic tree: {:?}",
                    missing
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_knows_all_declared_names() {
        assert_eq!(GmpeRegistry::names().count(), 22);
        assert!(GmpeRegistry::contains("SadighEtAl_1997_AttenRel"));
        assert!(GmpeRegistry::contains("BA_2008_AttenRel"));
        assert!(!GmpeRegistry::contains("Sadigh_1997"));
    }

    #[test]
    fn test_instantiate_returns_named_model() {
        let gmpe = GmpeRegistry::instantiate("CY_2008_AttenRel").expect("registered");
        assert_eq!(gmpe.name(), "CY_2008_AttenRel");
        assert!(GmpeRegistry::instantiate("NoSuch_AttenRel").is_none());
    }
}
