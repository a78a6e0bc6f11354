// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Applying sampled uncertainties to source model copies.

Both entry points are pure with respect to everything except the source
passed in: the caller supplies a per-realization copy of the source, and
the shared base model is never touched. Relative uncertainties repeat one
value across all GR MFDs of a matching source; absolute uncertainties
consume one value (or pair) per GR MFD in order of appearance. MFDs that
are not of Gutenberg-Richter form are skipped, by design, not as an
error.

The dispatch is a closed match over `(uncertainty type, value)`; the
validator only produces matching combinations, so a mismatched arm is a
programmer error and panics.
*/

use tracing::trace;

use temblor_structures::{Source, TruncatedGrMfd};

use crate::tree::{BranchSet, BranchValue, Filter, UncertaintyType};

/// Whether a branch set's filter matches `source`. A branch set without a
/// filter matches every source. Pure function: no side effects, same
/// answer on every call.
pub fn filter_source(filter: Option<&Filter>, source: &Source) -> bool {
    match filter {
        None => true,
        Some(Filter::Sources(ids)) => ids.iter().any(|id| id == &source.id),
        Some(Filter::TectonicRegionType(trt)) => trt == &source.tectonic_region_type,
        Some(Filter::SourceType(kind)) => *kind == source.kind,
    }
}

/// Apply one sampled uncertainty to `source` if the filter matches.
///
/// `source` must be a private per-realization copy; all changes happen in
/// place on its MFDs.
pub fn apply_uncertainty(
    uncertainty_type: UncertaintyType,
    filter: Option<&Filter>,
    value: &BranchValue,
    source: &mut Source,
) {
    if !filter_source(filter, source) {
        return;
    }
    trace!(
        source = %source.id,
        uncertainty = %uncertainty_type,
        "applying uncertainty"
    );

    match (uncertainty_type, value) {
        (UncertaintyType::BGrRelative, BranchValue::Single(delta)) => {
            for mfd in gr_mfds(source) {
                mfd.increment_b(*delta);
            }
        }
        (UncertaintyType::MaxMagGrRelative, BranchValue::Single(delta)) => {
            for mfd in gr_mfds(source) {
                mfd.increment_max_mag(*delta);
            }
        }
        (UncertaintyType::MaxMagGrAbsolute, BranchValue::MaxMagList(values)) => {
            let mut values = values.iter();
            for mfd in gr_mfds(source) {
                // validation guarantees one value per GR MFD
                let max_mag = *values.next().expect("fewer maxMag values than GR MFDs");
                mfd.set_max_mag(max_mag);
            }
        }
        (UncertaintyType::AbGrAbsolute, BranchValue::AbPairs(pairs)) => {
            let mut pairs = pairs.iter();
            for mfd in gr_mfds(source) {
                let (a_val, b_val) = *pairs.next().expect("fewer a/b pairs than GR MFDs");
                mfd.set_ab(a_val, b_val);
            }
        }
        (uncertainty_type, value) => unreachable!(
            "uncertainty type {} cannot be applied with value {:?}",
            uncertainty_type, value
        ),
    }
}

fn gr_mfds(source: &mut Source) -> impl Iterator<Item = &mut TruncatedGrMfd> {
    source.mfds.iter_mut().filter_map(|mfd| mfd.as_gr_mut())
}

impl BranchSet {
    /// Apply this branch set's uncertainty with the sampled `value` to
    /// `source`, if it passes the filter. Not called for `sourceModel` or
    /// `gmpeModel` uncertainties.
    pub fn apply_uncertainty(&self, value: &BranchValue, source: &mut Source) {
        apply_uncertainty(self.uncertainty_type, self.filter.as_ref(), value, source);
    }

    /// Whether this branch set's uncertainty applies to `source`.
    pub fn filter_source(&self, source: &Source) -> bool {
        filter_source(self.filter.as_ref(), source)
    }
}
