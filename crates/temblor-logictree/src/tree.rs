// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
The logic tree data model and weighted sampling.

A [`LogicTree`] owns its branch sets in an arena indexed by
[`BranchSetId`]; branches refer to their child branch set by id instead of
by pointer. The parsed tree is therefore immutable, `Send + Sync`, and can
be shared read-only across concurrent realization workers - each worker
only needs its own seeded generator and its own source model copy.

Sampling is alias-free cumulative-weight selection: one uniform draw per
branch set, then a walk over the branches accumulating their exact decimal
weights until the running sum reaches the draw.
*/

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use temblor_structures::SourceKind;

/// The closed set of uncertainty types a branch set can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UncertaintyType {
    /// Branch values name alternative source model files. Allowed only on
    /// the first branch set of a source model logic tree.
    SourceModel,
    /// Branch values name ground motion prediction equations. Allowed only
    /// in GMPE logic trees.
    GmpeModel,
    /// Replace the `a` and `b` GR values, one pair per GR MFD.
    AbGrAbsolute,
    /// Add a delta to the GR `b` value.
    BGrRelative,
    /// Add a delta to the GR maximum magnitude.
    MaxMagGrRelative,
    /// Replace the GR maximum magnitude, one value per GR MFD.
    MaxMagGrAbsolute,
}

impl UncertaintyType {
    /// The `uncertaintyType` attribute spelling for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            UncertaintyType::SourceModel => "sourceModel",
            UncertaintyType::GmpeModel => "gmpeModel",
            UncertaintyType::AbGrAbsolute => "abGRAbsolute",
            UncertaintyType::BGrRelative => "bGRRelative",
            UncertaintyType::MaxMagGrRelative => "maxMagGRRelative",
            UncertaintyType::MaxMagGrAbsolute => "maxMagGRAbsolute",
        }
    }

    /// Absolute uncertainties replace MFD parameters outright and require
    /// an `applyToSources` filter naming exactly one source.
    pub fn is_absolute(&self) -> bool {
        matches!(
            self,
            UncertaintyType::AbGrAbsolute | UncertaintyType::MaxMagGrAbsolute
        )
    }
}

impl fmt::Display for UncertaintyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UncertaintyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sourceModel" => Ok(UncertaintyType::SourceModel),
            "gmpeModel" => Ok(UncertaintyType::GmpeModel),
            "abGRAbsolute" => Ok(UncertaintyType::AbGrAbsolute),
            "bGRRelative" => Ok(UncertaintyType::BGrRelative),
            "maxMagGRRelative" => Ok(UncertaintyType::MaxMagGrRelative),
            "maxMagGRAbsolute" => Ok(UncertaintyType::MaxMagGrAbsolute),
            other => Err(format!("unknown uncertaintyType '{}'", other)),
        }
    }
}

/// Which sources a branch set's uncertainty applies to. At most one filter
/// is allowed per branch set; a branch set without a filter matches every
/// source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// `applyToSources`: match sources by id.
    Sources(Vec<String>),
    /// `applyToTectonicRegionType`: match sources by tectonic region type.
    TectonicRegionType(String),
    /// `applyToSourceType`: match sources by geometry kind.
    SourceType(SourceKind),
}

/// The typed payload of a branch, determined by the owning branch set's
/// uncertainty type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchValue {
    /// Resolved path of the referenced source model file.
    SourceModel(PathBuf),
    /// A single float: relative uncertainties.
    Single(f64),
    /// One replacement maximum magnitude per GR MFD of the target source.
    MaxMagList(Vec<f64>),
    /// One `(a, b)` replacement pair per GR MFD of the target source.
    AbPairs(Vec<(f64, f64)>),
    /// A GMPE name resolvable through the registry.
    Gmpe(String),
}

/// Arena index of a [`BranchSet`] within its [`LogicTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchSetId(pub(crate) usize);

/// One alternative within a branch set.
#[derive(Debug, Clone)]
pub struct Branch {
    pub branch_id: String,
    /// Exact decimal weight in (0, 1]; sibling weights sum to exactly 1.
    pub weight: Decimal,
    pub value: BranchValue,
    pub child_branchset: Option<BranchSetId>,
}

/// An ordered set of weighted branches sharing one uncertainty type and
/// at most one filter.
#[derive(Debug, Clone)]
pub struct BranchSet {
    pub uncertainty_type: UncertaintyType,
    pub filter: Option<Filter>,
    pub branches: Vec<Branch>,
}

impl BranchSet {
    pub fn new(uncertainty_type: UncertaintyType, filter: Option<Filter>) -> Self {
        BranchSet {
            uncertainty_type,
            filter,
            branches: Vec::new(),
        }
    }

    /// Take a weighted random branch and return it.
    ///
    /// Draws one uniform value in `[0, 1)` and walks the branch list
    /// accumulating exact decimal weights until the running sum reaches the
    /// draw. Validation guarantees the weights sum to exactly 1; that
    /// precondition is re-verified here because test construction paths can
    /// bypass validation.
    pub fn sample(&self, rnd: &mut dyn UniformSource) -> &Branch {
        let diceroll = Decimal::from_f64_retain(rnd.uniform())
            .expect("uniform draw outside decimal range");
        let mut acc = Decimal::ZERO;
        for branch in &self.branches {
            acc += branch.weight;
            if acc >= diceroll {
                return branch;
            }
        }
        panic!("do weights really sum up to 1.0?")
    }
}

/// A parsed, validated logic tree: a branch set arena plus the root id.
#[derive(Debug, Clone)]
pub struct LogicTree {
    pub(crate) branchsets: Vec<BranchSet>,
    pub(crate) root: BranchSetId,
}

impl LogicTree {
    pub fn root(&self) -> &BranchSet {
        &self.branchsets[self.root.0]
    }

    pub fn branchset(&self, id: BranchSetId) -> &BranchSet {
        &self.branchsets[id.0]
    }

    pub fn branchsets(&self) -> impl Iterator<Item = &BranchSet> {
        self.branchsets.iter()
    }

    /// Sample one path from the root down to a leaf.
    ///
    /// Returns the chosen branches in order, one per branch set level. The
    /// last branch's value is the leaf value of the realization. The same
    /// generator state always yields the same path.
    pub fn sample_path(&self, rnd: &mut dyn UniformSource) -> Vec<&Branch> {
        let mut path = Vec::new();
        let mut branchset = self.root();
        loop {
            let branch = branchset.sample(rnd);
            path.push(branch);
            match branch.child_branchset {
                Some(id) => branchset = self.branchset(id),
                None => break,
            }
        }
        path
    }
}

/// A seedable source of uniform draws in `[0, 1)`.
///
/// Sampling goes through this single-method abstraction instead of any
/// global random state, so reproducibility is guaranteed and concurrent
/// realizations never share generator state. Production sampling uses a
/// seeded [`rand::rngs::StdRng`]; tests may substitute scripted draws.
pub trait UniformSource {
    fn uniform(&mut self) -> f64;
}

impl UniformSource for rand::rngs::StdRng {
    fn uniform(&mut self) -> f64 {
        use rand::Rng;
        self.gen::<f64>()
    }
}
