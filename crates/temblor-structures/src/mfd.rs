// Copyright 2026 Temblor Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Magnitude-frequency distributions.

Two closed forms exist: the truncated Gutenberg-Richter distribution
(parametric, carries the `a`/`b` values the logic tree mutates) and the
evenly discretized distribution (a flat table of occurrence rates, opaque
to GR-specific uncertainties).
*/

use serde::{Deserialize, Serialize};

/// Truncated Gutenberg-Richter magnitude-frequency distribution.
///
/// `log10(N(>= m)) = a - b * m`, truncated to `[min_mag, max_mag]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncatedGrMfd {
    pub a_val: f64,
    pub b_val: f64,
    pub min_mag: f64,
    pub max_mag: f64,
}

impl TruncatedGrMfd {
    /// Replace both the `a` and `b` values (absolute GR uncertainty).
    pub fn set_ab(&mut self, a_val: f64, b_val: f64) {
        self.a_val = a_val;
        self.b_val = b_val;
    }

    /// Shift the `b` value by `delta` (relative GR uncertainty).
    pub fn increment_b(&mut self, delta: f64) {
        self.b_val += delta;
    }

    /// Shift the maximum magnitude by `delta`.
    pub fn increment_max_mag(&mut self, delta: f64) {
        self.max_mag += delta;
    }

    /// Replace the maximum magnitude.
    pub fn set_max_mag(&mut self, max_mag: f64) {
        self.max_mag = max_mag;
    }
}

/// Evenly discretized magnitude-frequency distribution.
///
/// `rates[i]` is the annual occurrence rate of the bin centered at
/// `min_mag + i * bin_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvenlyDiscretizedMfd {
    pub min_mag: f64,
    pub bin_width: f64,
    pub rates: Vec<f64>,
}

/// A magnitude-frequency distribution of either supported form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mfd {
    TruncatedGr(TruncatedGrMfd),
    EvenlyDiscretized(EvenlyDiscretizedMfd),
}

impl Mfd {
    /// Whether this MFD is of Gutenberg-Richter form. GR-specific
    /// uncertainties skip every MFD for which this is false.
    pub fn is_gr(&self) -> bool {
        matches!(self, Mfd::TruncatedGr(_))
    }

    pub fn as_gr(&self) -> Option<&TruncatedGrMfd> {
        match self {
            Mfd::TruncatedGr(gr) => Some(gr),
            Mfd::EvenlyDiscretized(_) => None,
        }
    }

    pub fn as_gr_mut(&mut self) -> Option<&mut TruncatedGrMfd> {
        match self {
            Mfd::TruncatedGr(gr) => Some(gr),
            Mfd::EvenlyDiscretized(_) => None,
        }
    }
}
