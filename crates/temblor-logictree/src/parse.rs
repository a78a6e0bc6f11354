// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Shared recursive-descent framework for logic tree documents.

Both tree variants (source model, GMPE) walk the same structure:

```text
logicTree > logicTreeBranchingLevel > logicTreeBranchSet > logicTreeBranch
                                                           > uncertaintyModel
                                                           > uncertaintyWeight
```

The walk itself, branch-ID bookkeeping and weight checking live here; the
per-variant semantic rules are supplied through [`TreeSemantics`] hooks.
The branch-ID registry and the open-ends set are owned by the single
parse invocation, so several trees can be parsed concurrently without
interference.

Structural defects (missing attributes or elements, unknown uncertainty
types, malformed weights) are the schema-violation class and reported as
`Parsing` errors without a line number; semantic rule violations are
`Validation` errors carrying the offending element's line.
*/

use std::collections::HashMap;
use std::path::Path;

use roxmltree::{Document, Node};
use rust_decimal::Decimal;
use tracing::debug;

use crate::tree::{Branch, BranchSet, BranchSetId, BranchValue, Filter, LogicTree, UncertaintyType};
use crate::types::{LogicTreeError, LtResult};

pub(crate) const TAG_BRANCHING_LEVEL: &str = "logicTreeBranchingLevel";
pub(crate) const TAG_BRANCH_SET: &str = "logicTreeBranchSet";
pub(crate) const TAG_BRANCH: &str = "logicTreeBranch";
pub(crate) const TAG_MODEL: &str = "uncertaintyModel";
pub(crate) const TAG_WEIGHT: &str = "uncertaintyWeight";

/// Filter attributes recognized on a branch set. `applyToBranches` is
/// handled separately: it steers tree construction and is not retained.
pub(crate) const FILTER_ATTRS: [&str; 3] = [
    "applyToSources",
    "applyToTectonicRegionType",
    "applyToSourceType",
];

/// Raw `applyTo*` attributes of one branch set, in attribute order.
#[derive(Debug, Default)]
pub(crate) struct RawFilters {
    pub pairs: Vec<(String, String)>,
}

impl RawFilters {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The single `(name, value)` pair, if exactly one filter is set.
    pub fn single(&self) -> Option<(&str, &str)> {
        match self.pairs.as_slice() {
            [(name, value)] => Some((name.as_str(), value.as_str())),
            _ => None,
        }
    }
}

/// Per-invocation parse context: error construction with file/line info.
pub(crate) struct ParseCtx<'a, 'input> {
    pub filename: &'a str,
    pub basepath: &'a Path,
    doc: &'a Document<'input>,
}

impl<'a, 'input> ParseCtx<'a, 'input> {
    pub fn new(filename: &'a str, basepath: &'a Path, doc: &'a Document<'input>) -> Self {
        ParseCtx {
            filename,
            basepath,
            doc,
        }
    }

    pub fn parsing(&self, message: impl Into<String>) -> LogicTreeError {
        LogicTreeError::Parsing {
            filename: self.filename.to_string(),
            basepath: self.basepath.to_path_buf(),
            message: message.into(),
        }
    }

    /// A parsing error attributed to a *referenced* file rather than the
    /// logic tree document itself.
    pub fn parsing_in(&self, filename: &str, message: impl Into<String>) -> LogicTreeError {
        LogicTreeError::Parsing {
            filename: filename.to_string(),
            basepath: self.basepath.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn validation(&self, node: Node<'_, '_>, message: impl Into<String>) -> LogicTreeError {
        let lineno = self.doc.text_pos_at(node.range().start).row;
        LogicTreeError::Validation {
            filename: self.filename.to_string(),
            basepath: self.basepath.to_path_buf(),
            lineno,
            message: message.into(),
        }
    }
}

/// Reference to one branch inside the arena under construction.
pub(crate) type BranchRef = (BranchSetId, usize);

/// The branch set arena plus the bookkeeping the walk needs: the global
/// branch-ID registry and the open ends of the previous branching level.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    branchsets: Vec<BranchSet>,
    root: Option<BranchSetId>,
    branch_index: HashMap<String, BranchRef>,
    open_ends: Vec<BranchRef>,
}

impl TreeBuilder {
    fn push(&mut self, branchset: BranchSet) -> BranchSetId {
        let id = BranchSetId(self.branchsets.len());
        self.branchsets.push(branchset);
        id
    }

    pub fn branchset(&self, id: BranchSetId) -> &BranchSet {
        &self.branchsets[id.0]
    }

    pub fn branch_ref(&self, branch_id: &str) -> Option<BranchRef> {
        self.branch_index.get(branch_id).copied()
    }

    pub fn branch(&self, (bs, idx): BranchRef) -> &Branch {
        &self.branchsets[bs.0].branches[idx]
    }

    pub fn is_open_end(&self, branch: BranchRef) -> bool {
        self.open_ends.contains(&branch)
    }

    pub fn set_child(&mut self, (bs, idx): BranchRef, child: BranchSetId) {
        self.branchsets[bs.0].branches[idx].child_branchset = Some(child);
    }

    /// Make `child` the child branch set of every open-end branch.
    pub fn attach_to_open_ends(&mut self, child: BranchSetId) {
        for branch_ref in self.open_ends.clone() {
            self.set_child(branch_ref, child);
        }
    }
}

/// Per-variant semantic hooks. Mirrors the abstract methods of the shared
/// validation framework: each variant supplies its own filter, branch set,
/// value and whole-tree rules, and may override how a branch set attaches
/// to the previous level.
pub(crate) trait TreeSemantics {
    /// Check the raw filters for `uncertainty_type` and produce the typed
    /// filter to retain, if any.
    fn validate_filters(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        uncertainty_type: UncertaintyType,
        raw: &RawFilters,
    ) -> LtResult<Option<Filter>>;

    /// Check a freshly built (still branch-less) branch set against its
    /// position in the tree. `depth` is the branching level, `number` the
    /// branch set's index within it, both zero-based.
    fn validate_branchset(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        depth: usize,
        number: usize,
        branchset: &BranchSet,
    ) -> LtResult<()>;

    /// Parse and check one branch's `uncertaintyModel` text.
    fn validate_uncertainty_value(
        &mut self,
        ctx: &ParseCtx<'_, '_>,
        node: Node<'_, '_>,
        branchset: &BranchSet,
        value: &str,
    ) -> LtResult<BranchValue>;

    /// Check the whole parsed tree for consistency.
    fn validate_tree(
        &mut self,
        _ctx: &ParseCtx<'_, '_>,
        _node: Node<'_, '_>,
        _tree: &LogicTree,
    ) -> LtResult<()> {
        Ok(())
    }

    /// Attach a non-root branch set to branches of the previous level. The
    /// default attaches to every open end; the source model variant
    /// overrides this to honor `applyToBranches`.
    fn apply_branchset(
        &mut self,
        _ctx: &ParseCtx<'_, '_>,
        _node: Node<'_, '_>,
        builder: &mut TreeBuilder,
        branchset: BranchSetId,
    ) -> LtResult<()> {
        builder.attach_to_open_ends(branchset);
        Ok(())
    }
}

/// Locate the `logicTree` element under the document root.
pub(crate) fn find_logic_tree<'a, 'input>(
    ctx: &ParseCtx<'_, '_>,
    doc: &'a Document<'input>,
) -> LtResult<Node<'a, 'input>> {
    let root = doc.root_element();
    if root.tag_name().name() != "nrml" {
        return Err(ctx.parsing(format!(
            "expected root element 'nrml', got '{}'",
            root.tag_name().name()
        )));
    }
    root.children()
        .find(|n| n.is_element() && n.tag_name().name() == "logicTree")
        .ok_or_else(|| ctx.parsing("document has no 'logicTree' element"))
}

/// Walk the whole tree, calling into `semantics` at every decision point,
/// and return the finished arena.
pub(crate) fn parse_tree<S: TreeSemantics>(
    ctx: &ParseCtx<'_, '_>,
    tree_node: Node<'_, '_>,
    semantics: &mut S,
) -> LtResult<LogicTree> {
    let mut builder = TreeBuilder::default();

    let levels = tree_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == TAG_BRANCHING_LEVEL);
    for (depth, level_node) in levels.enumerate() {
        parse_branchinglevel(ctx, level_node, depth, semantics, &mut builder)?;
    }

    let root = builder
        .root
        .ok_or_else(|| ctx.parsing("logic tree has no branching levels"))?;
    let tree = LogicTree {
        branchsets: builder.branchsets,
        root,
    };
    semantics.validate_tree(ctx, tree_node, &tree)?;
    debug!(
        filename = ctx.filename,
        branchsets = tree.branchsets.len(),
        "parsed logic tree"
    );
    Ok(tree)
}

/// Parse one branching level, keeping track of the open ends: after each
/// level only the branches created on it may receive a child branch set.
fn parse_branchinglevel<S: TreeSemantics>(
    ctx: &ParseCtx<'_, '_>,
    level_node: Node<'_, '_>,
    depth: usize,
    semantics: &mut S,
    builder: &mut TreeBuilder,
) -> LtResult<()> {
    let mut new_open_ends = Vec::new();
    let branchset_nodes = level_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == TAG_BRANCH_SET);
    for (number, branchset_node) in branchset_nodes.enumerate() {
        let branchset_id =
            parse_branchset(ctx, branchset_node, depth, number, semantics, builder)?;
        if depth == 0 && number == 0 {
            builder.root = Some(branchset_id);
        } else {
            semantics.apply_branchset(ctx, branchset_node, builder, branchset_id)?;
        }
        let n_branches = builder.branchset(branchset_id).branches.len();
        new_open_ends.extend((0..n_branches).map(|idx| (branchset_id, idx)));
    }
    builder.open_ends = new_open_ends;
    Ok(())
}

fn parse_branchset<S: TreeSemantics>(
    ctx: &ParseCtx<'_, '_>,
    branchset_node: Node<'_, '_>,
    depth: usize,
    number: usize,
    semantics: &mut S,
    builder: &mut TreeBuilder,
) -> LtResult<BranchSetId> {
    let uncertainty_type: UncertaintyType = branchset_node
        .attribute("uncertaintyType")
        .ok_or_else(|| ctx.parsing("branch set is missing 'uncertaintyType' attribute"))?
        .parse()
        .map_err(|e: String| ctx.parsing(e))?;

    let mut raw = RawFilters::default();
    for name in FILTER_ATTRS {
        if let Some(value) = branchset_node.attribute(name) {
            raw.pairs.push((name.to_string(), value.to_string()));
        }
    }
    let filter = semantics.validate_filters(ctx, branchset_node, uncertainty_type, &raw)?;

    let branchset = BranchSet::new(uncertainty_type, filter);
    semantics.validate_branchset(ctx, branchset_node, depth, number, &branchset)?;
    let branchset_id = builder.push(branchset);

    parse_branches(ctx, branchset_node, branchset_id, semantics, builder)?;
    Ok(branchset_id)
}

/// Parse and attach the branches of one branch set, checking value
/// syntax, global branch-ID uniqueness and the exact weight sum.
fn parse_branches<S: TreeSemantics>(
    ctx: &ParseCtx<'_, '_>,
    branchset_node: Node<'_, '_>,
    branchset_id: BranchSetId,
    semantics: &mut S,
    builder: &mut TreeBuilder,
) -> LtResult<()> {
    let mut branches: Vec<Branch> = Vec::new();
    let mut weight_sum = Decimal::ZERO;

    let branch_nodes = branchset_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == TAG_BRANCH);
    for branch_node in branch_nodes {
        let branch_id = branch_node
            .attribute("branchID")
            .ok_or_else(|| ctx.parsing("branch is missing 'branchID' attribute"))?
            .to_string();

        let weight_node = child_element(branch_node, TAG_WEIGHT)
            .ok_or_else(|| ctx.parsing("branch has no 'uncertaintyWeight' element"))?;
        let weight_text = weight_node.text().unwrap_or("").trim();
        let weight: Decimal = weight_text
            .parse()
            .map_err(|_| ctx.parsing(format!("invalid branch weight '{}'", weight_text)))?;
        weight_sum += weight;

        let value_node = child_element(branch_node, TAG_MODEL)
            .ok_or_else(|| ctx.parsing("branch has no 'uncertaintyModel' element"))?;
        let value_text = value_node.text().unwrap_or("").trim();
        let value = semantics.validate_uncertainty_value(
            ctx,
            value_node,
            builder.branchset(branchset_id),
            value_text,
        )?;

        if builder.branch_index.contains_key(&branch_id)
            || branches.iter().any(|b| b.branch_id == branch_id)
        {
            return Err(ctx.validation(
                branch_node,
                format!("branchID '{}' is not unique", branch_id),
            ));
        }
        branches.push(Branch {
            branch_id,
            weight,
            value,
            child_branchset: None,
        });
    }

    if weight_sum != Decimal::ONE {
        return Err(ctx.validation(
            branchset_node,
            "branchset weights don't sum up to 1.0".to_string(),
        ));
    }

    for (idx, branch) in branches.iter().enumerate() {
        builder
            .branch_index
            .insert(branch.branch_id.clone(), (branchset_id, idx));
    }
    builder.branchsets[branchset_id.0].branches = branches;
    Ok(())
}

pub(crate) fn child_element<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Strict float grammar for uncertainty values: `[+-]?(\d+|\d*.\d+)`.
/// Exponents, `inf` and `nan` are rejected.
pub(crate) fn parse_strict_float(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let valid = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => {
            int_part.chars().all(|c| c.is_ascii_digit())
                && !frac_part.is_empty()
                && frac_part.chars().all(|c| c.is_ascii_digit())
        }
        None => !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit()),
    };
    if valid {
        text.parse().ok()
    } else {
        None
    }
}
