// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

//! End-to-end sampling: parse both trees from disk, draw realizations
//! and apply them to source model copies.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use temblor_logictree::{
    BranchValue, LogicTreeProcessor, UniformSource,
};
use temblor_structures::NrmlSourceModelReader;

const SM1: &str = r#"
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <sourceModel>
    <simpleFaultSource id="src01" name="Mount Diablo Thrust"
                       tectonicRegion="Active Shallow Crust">
      <truncGutenbergRichterMFD aValue="-3.5" bValue="1.0"
                                minMag="5.0" maxMag="6.5" />
    </simpleFaultSource>
  </sourceModel>
</nrml>
"#;

const SMLT: &str = r#"
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <logicTree logicTreeID="lt1">
    <logicTreeBranchingLevel branchingLevelID="bl1">
      <logicTreeBranchSet branchSetID="bs1" uncertaintyType="sourceModel">
        <logicTreeBranch branchID="b1">
          <uncertaintyModel>sm1.xml</uncertaintyModel>
          <uncertaintyWeight>1.0</uncertaintyWeight>
        </logicTreeBranch>
      </logicTreeBranchSet>
    </logicTreeBranchingLevel>
    <logicTreeBranchingLevel branchingLevelID="bl2">
      <logicTreeBranchSet branchSetID="bs2" uncertaintyType="maxMagGRRelative">
        <logicTreeBranch branchID="b2">
          <uncertaintyModel>+123</uncertaintyModel>
          <uncertaintyWeight>0.6</uncertaintyWeight>
        </logicTreeBranch>
        <logicTreeBranch branchID="b3">
          <uncertaintyModel>-123</uncertaintyModel>
          <uncertaintyWeight>0.4</uncertaintyWeight>
        </logicTreeBranch>
      </logicTreeBranchSet>
    </logicTreeBranchingLevel>
  </logicTree>
</nrml>
"#;

const GMPELT: &str = r#"
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <logicTree logicTreeID="lt2">
    <logicTreeBranchingLevel branchingLevelID="bl1">
      <logicTreeBranchSet branchSetID="bs1" uncertaintyType="gmpeModel"
                          applyToTectonicRegionType="Active Shallow Crust">
        <logicTreeBranch branchID="g1">
          <uncertaintyModel>SadighEtAl_1997_AttenRel</uncertaintyModel>
          <uncertaintyWeight>0.7</uncertaintyWeight>
        </logicTreeBranch>
        <logicTreeBranch branchID="g2">
          <uncertaintyModel>BA_2008_AttenRel</uncertaintyModel>
          <uncertaintyWeight>0.3</uncertaintyWeight>
        </logicTreeBranch>
      </logicTreeBranchSet>
    </logicTreeBranchingLevel>
  </logicTree>
</nrml>
"#;

fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("sm1.xml"), SM1).unwrap();
    fs::write(dir.path().join("smlt.xml"), SMLT).unwrap();
    fs::write(dir.path().join("gmpelt.xml"), GMPELT).unwrap();
    dir
}

fn processor(basepath: &Path) -> LogicTreeProcessor {
    LogicTreeProcessor::new(basepath, "smlt.xml", "gmpelt.xml", &NrmlSourceModelReader)
        .expect("both trees valid")
}

/// Replays a fixed script of uniform draws.
struct ScriptedDraws(std::vec::IntoIter<f64>);

impl UniformSource for ScriptedDraws {
    fn uniform(&mut self) -> f64 {
        self.0.next().expect("script exhausted")
    }
}

#[test]
fn test_processor_is_debug_printable() {
    let dir = fixture_dir();
    let proc = processor(dir.path());
    let rendered = format!("{:?}", proc);
    assert!(rendered.contains("LogicTreeProcessor"));
    assert!(rendered.contains("smlt.xml"));
}

#[test]
fn test_two_level_tree_shape() {
    let dir = fixture_dir();
    let proc = processor(dir.path());
    let tree = proc.source_model_logic_tree().tree();

    let root = tree.root();
    assert_eq!(root.branches.len(), 1);
    assert_eq!(
        root.branches[0].value,
        BranchValue::SourceModel(dir.path().join("sm1.xml"))
    );

    let child = tree.branchset(root.branches[0].child_branchset.expect("chained"));
    let values: Vec<&BranchValue> = child.branches.iter().map(|b| &b.value).collect();
    assert_eq!(
        values,
        [&BranchValue::Single(123.0), &BranchValue::Single(-123.0)]
    );
    assert_eq!(child.branches[0].weight, "0.6".parse().unwrap());
    assert_eq!(child.branches[1].weight, "0.4".parse().unwrap());
}

#[test]
fn test_scripted_path_selects_by_cumulative_weight() {
    let dir = fixture_dir();
    let proc = processor(dir.path());
    let tree = proc.source_model_logic_tree().tree();

    // first draw picks the only root branch, second lands past 0.6
    let mut rnd = ScriptedDraws(vec![0.5, 0.95].into_iter());
    let path = tree.sample_path(&mut rnd);
    let ids: Vec<&str> = path.iter().map(|b| b.branch_id.as_str()).collect();
    assert_eq!(ids, ["b1", "b3"]);
}

#[test]
fn test_sampling_is_deterministic_per_seed() {
    let dir = fixture_dir();
    let proc = processor(dir.path());

    for seed in [0u64, 23, 42, 9_999_999] {
        let first = proc.sample_source_model(seed);
        let second = proc.sample_source_model(seed);
        assert_eq!(first.branch_ids, second.branch_ids, "seed {}", seed);
        assert_eq!(first.source_model_path, second.source_model_path);

        let gmpe_first = proc.sample_gmpe(seed);
        let gmpe_second = proc.sample_gmpe(seed);
        assert_eq!(gmpe_first.branch_ids, gmpe_second.branch_ids, "seed {}", seed);
    }
}

#[test]
fn test_realization_applies_sampled_uncertainty() {
    let dir = fixture_dir();
    let proc = processor(dir.path());

    let (realization, model) = proc.realize_source_model(17);
    assert_eq!(realization.branch_ids.len(), 2);
    assert_eq!(realization.modifications().len(), 1);

    let max_mag = model.get("src01").unwrap().mfds[0].as_gr().unwrap().max_mag;
    match realization.branch_ids[1].as_str() {
        "b2" => assert_eq!(max_mag, 6.5 + 123.0),
        "b3" => assert_eq!(max_mag, 6.5 - 123.0),
        other => panic!("unexpected branch '{}'", other),
    }

    // the shared base model is never mutated
    let base = proc
        .source_model_logic_tree()
        .source_model(&realization.source_model_path)
        .unwrap();
    assert_eq!(base.get("src01").unwrap().mfds[0].as_gr().unwrap().max_mag, 6.5);
}

#[test]
fn test_gmpe_realization_assigns_every_trt() {
    let dir = fixture_dir();
    let proc = processor(dir.path());

    let realization = proc.sample_gmpe(99);
    let names = realization.names();
    assert_eq!(names.len(), 1);
    let gmpe = names["Active Shallow Crust"];
    assert!(
        gmpe == "SadighEtAl_1997_AttenRel" || gmpe == "BA_2008_AttenRel",
        "got '{}'",
        gmpe
    );
}

#[test]
fn test_uncovered_trt_fails_construction() {
    let dir = fixture_dir();
    // a second source model region type the GMPE tree doesn't cover
    fs::write(
        dir.path().join("sm1.xml"),
        SM1.replace("Active Shallow Crust", "Subduction Interface"),
    )
    .unwrap();
    let result =
        LogicTreeProcessor::new(dir.path(), "smlt.xml", "gmpelt.xml", &NrmlSourceModelReader);
    let err = result.expect_err("gmpe tree does not cover the region type");
    assert_eq!(
        err.message(),
        "source models don't define sources of tectonic region type 'Active Shallow Crust'"
    );
}
