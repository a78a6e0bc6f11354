// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Seismic sources and the source model aggregate.

The lookups on [`SourceModel`] (tectonic region types, source kinds,
per-source GR MFD counts) are exactly what the logic tree validator needs
to check `applyTo*` filters and absolute uncertainty value counts.
*/

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mfd::Mfd;

/// The four recognized source geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Point,
    Area,
    SimpleFault,
    ComplexFault,
}

impl SourceKind {
    /// The tag used for this kind in logic tree filters and NRML documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Point => "point",
            SourceKind::Area => "area",
            SourceKind::SimpleFault => "simpleFault",
            SourceKind::ComplexFault => "complexFault",
        }
    }

    /// Map an NRML source element name to a kind, e.g. `pointSource`.
    pub fn from_element_name(name: &str) -> Option<SourceKind> {
        match name {
            "pointSource" => Some(SourceKind::Point),
            "areaSource" => Some(SourceKind::Area),
            "simpleFaultSource" => Some(SourceKind::SimpleFault),
            "complexFaultSource" => Some(SourceKind::ComplexFault),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(SourceKind::Point),
            "area" => Ok(SourceKind::Area),
            "simpleFault" => Ok(SourceKind::SimpleFault),
            "complexFault" => Ok(SourceKind::ComplexFault),
            other => Err(format!("unknown source type '{}'", other)),
        }
    }
}

/// A single seismic source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Unique source identifier within the model.
    pub id: String,
    /// Human-readable name, if the document carries one.
    pub name: Option<String>,
    /// Tectonic region type, e.g. "Active Shallow Crust".
    pub tectonic_region_type: String,
    pub kind: SourceKind,
    /// Magnitude-frequency distributions in document order. Fault sources
    /// carry exactly one; point and area sources may carry several, one per
    /// nodal plane / rupture rate model.
    pub mfds: Vec<Mfd>,
}

impl Source {
    /// Number of Gutenberg-Richter MFDs on this source. Absolute GR
    /// uncertainties must supply exactly this many values (twice as many
    /// for a/b pairs).
    pub fn gr_mfd_count(&self) -> usize {
        self.mfds.iter().filter(|m| m.is_gr()).count()
    }
}

/// An ordered collection of seismic sources parsed from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceModel {
    pub sources: Vec<Source>,
}

impl SourceModel {
    pub fn new(sources: Vec<Source>) -> Self {
        SourceModel { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    /// All tectonic region types used by at least one source.
    pub fn tectonic_region_types(&self) -> BTreeSet<String> {
        self.sources
            .iter()
            .map(|s| s.tectonic_region_type.clone())
            .collect()
    }

    /// All source kinds occurring in the model.
    pub fn source_kinds(&self) -> BTreeSet<SourceKind> {
        self.sources.iter().map(|s| s.kind).collect()
    }

    /// Map from source id to the number of GR MFDs on that source.
    pub fn gr_mfd_counts(&self) -> HashMap<String, usize> {
        self.sources
            .iter()
            .map(|s| (s.id.clone(), s.gr_mfd_count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mfd::{EvenlyDiscretizedMfd, TruncatedGrMfd};

    fn sample_model() -> SourceModel {
        let gr = Mfd::TruncatedGr(TruncatedGrMfd {
            a_val: -3.5,
            b_val: 1.0,
            min_mag: 5.0,
            max_mag: 7.0,
        });
        let flat = Mfd::EvenlyDiscretized(EvenlyDiscretizedMfd {
            min_mag: 5.0,
            bin_width: 0.1,
            rates: vec![0.1, 0.05],
        });
        SourceModel::new(vec![
            Source {
                id: "src01".to_string(),
                name: None,
                tectonic_region_type: "Active Shallow Crust".to_string(),
                kind: SourceKind::SimpleFault,
                mfds: vec![gr.clone()],
            },
            Source {
                id: "src02".to_string(),
                name: Some("area".to_string()),
                tectonic_region_type: "Stable Shallow Crust".to_string(),
                kind: SourceKind::Area,
                mfds: vec![gr, flat],
            },
        ])
    }

    #[test]
    fn test_lookups() {
        let model = sample_model();
        assert_eq!(model.len(), 2);
        assert!(model.get("src01").is_some());
        assert!(model.get("nope").is_none());

        let trts: Vec<_> = model.tectonic_region_types().into_iter().collect();
        assert_eq!(trts, vec!["Active Shallow Crust", "Stable Shallow Crust"]);

        let kinds: Vec<_> = model.source_kinds().into_iter().collect();
        assert_eq!(kinds, vec![SourceKind::Area, SourceKind::SimpleFault]);
    }

    #[test]
    fn test_gr_mfd_counts_skip_non_gr() {
        let model = sample_model();
        let counts = model.gr_mfd_counts();
        assert_eq!(counts["src01"], 1);
        // src02 has one GR and one evenly discretized MFD
        assert_eq!(counts["src02"], 1);
    }

    #[test]
    fn test_source_kind_round_trip() {
        for kind in [
            SourceKind::Point,
            SourceKind::Area,
            SourceKind::SimpleFault,
            SourceKind::ComplexFault,
        ] {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert!("volcano".parse::<SourceKind>().is_err());
    }
}
