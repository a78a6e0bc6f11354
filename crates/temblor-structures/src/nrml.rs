// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
NRML-style source model reading.

Parses source model documents of the shape

```xml
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <sourceModel>
    <simpleFaultSource id="src01" name="Mount Diablo Thrust"
                       tectonicRegion="Active Shallow Crust">
      ...
      <truncGutenbergRichterMFD aValue="-3.5" bValue="1.0"
                                minMag="5.0" maxMag="7.0" />
    </simpleFaultSource>
  </sourceModel>
</nrml>
```

Only the parts the logic tree engine consumes are extracted: source ids,
names, tectonic region types, source kinds and magnitude-frequency
distributions. Geometry, rupture mechanics and scaling relations are
ignored. Point and area sources may carry several MFDs (one per rupture
rate model); fault sources carry one.
*/

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use tracing::debug;

use crate::mfd::{EvenlyDiscretizedMfd, Mfd, TruncatedGrMfd};
use crate::source::{Source, SourceKind, SourceModel};
use crate::types::{ModelError, ModelResult};

/// Collaborator interface: resolve a path into a parsed source model.
///
/// The logic tree engine calls this once per referenced source model file
/// and caches the result.
pub trait SourceModelReader {
    fn read(&self, path: &Path) -> ModelResult<SourceModel>;
}

/// Reads NRML-style source model XML files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NrmlSourceModelReader;

impl SourceModelReader for NrmlSourceModelReader {
    fn read(&self, path: &Path) -> ModelResult<SourceModel> {
        let text = fs::read_to_string(path)?;
        let model = parse_source_model(&text)?;
        debug!(
            path = %path.display(),
            sources = model.len(),
            "parsed source model"
        );
        Ok(model)
    }
}

/// Parse a source model document from an XML string.
pub fn parse_source_model(text: &str) -> ModelResult<SourceModel> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().name() != "nrml" {
        return Err(ModelError::Xml(format!(
            "expected root element 'nrml', got '{}'",
            root.tag_name().name()
        )));
    }
    let source_model = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "sourceModel")
        .ok_or_else(|| ModelError::Xml("document has no 'sourceModel' element".to_string()))?;

    let mut sources = Vec::new();
    for node in source_model.children().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        match SourceKind::from_element_name(name) {
            Some(kind) => sources.push(parse_source(node, kind)?),
            // geometry containers etc. cannot appear here; anything
            // unrecognized is a malformed document
            None => {
                return Err(ModelError::Xml(format!(
                    "unexpected element '{}' in sourceModel",
                    name
                )))
            }
        }
    }
    if sources.is_empty() {
        return Err(ModelError::EmptyModel);
    }
    Ok(SourceModel::new(sources))
}

fn parse_source(node: Node<'_, '_>, kind: SourceKind) -> ModelResult<Source> {
    let id = req_attr(node, "id")?.to_string();
    let tectonic_region_type = node
        .attribute("tectonicRegion")
        .ok_or_else(|| ModelError::InvalidSource {
            id: id.clone(),
            reason: "missing 'tectonicRegion' attribute".to_string(),
        })?
        .to_string();
    let name = node.attribute("name").map(str::to_string);

    // MFDs anywhere below the source element, in document order
    let mut mfds = Vec::new();
    for child in node.descendants().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "truncGutenbergRichterMFD" => mfds.push(Mfd::TruncatedGr(TruncatedGrMfd {
                a_val: attr_f64(child, "aValue", &id)?,
                b_val: attr_f64(child, "bValue", &id)?,
                min_mag: attr_f64(child, "minMag", &id)?,
                max_mag: attr_f64(child, "maxMag", &id)?,
            })),
            "incrementalMFD" => mfds.push(Mfd::EvenlyDiscretized(parse_incremental(child, &id)?)),
            _ => {}
        }
    }
    if mfds.is_empty() {
        return Err(ModelError::InvalidSource {
            id,
            reason: "source defines no magnitude-frequency distribution".to_string(),
        });
    }

    Ok(Source {
        id,
        name,
        tectonic_region_type,
        kind,
        mfds,
    })
}

fn parse_incremental(node: Node<'_, '_>, source_id: &str) -> ModelResult<EvenlyDiscretizedMfd> {
    let rates_text = node
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "occurRates")
        .and_then(|n| n.text())
        .ok_or_else(|| ModelError::InvalidSource {
            id: source_id.to_string(),
            reason: "incrementalMFD has no 'occurRates'".to_string(),
        })?;
    let rates = rates_text
        .split_whitespace()
        .map(|t| {
            t.parse::<f64>().map_err(|_| ModelError::InvalidSource {
                id: source_id.to_string(),
                reason: format!("invalid occurrence rate '{}'", t),
            })
        })
        .collect::<ModelResult<Vec<f64>>>()?;
    Ok(EvenlyDiscretizedMfd {
        min_mag: attr_f64(node, "minMag", source_id)?,
        bin_width: attr_f64(node, "binWidth", source_id)?,
        rates,
    })
}

fn req_attr<'a>(node: Node<'a, '_>, name: &str) -> ModelResult<&'a str> {
    node.attribute(name).ok_or_else(|| {
        ModelError::Xml(format!(
            "element '{}' is missing required attribute '{}'",
            node.tag_name().name(),
            name
        ))
    })
}

fn attr_f64(node: Node<'_, '_>, name: &str, source_id: &str) -> ModelResult<f64> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| ModelError::InvalidSource {
            id: source_id.to_string(),
            reason: format!(
                "'{}' is missing attribute '{}'",
                node.tag_name().name(),
                name
            ),
        })?;
    raw.parse::<f64>().map_err(|_| ModelError::InvalidSource {
        id: source_id.to_string(),
        reason: format!("attribute '{}' is not a number: '{}'", name, raw),
    })
}
