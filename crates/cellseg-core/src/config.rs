//! Numeric tolerances and run-detection thresholds.

use serde::{Deserialize, Serialize};

/// How close a measured value must be to a reference to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Fraction of the reference magnitude. Default: 0.01 (1%).
    pub relative: f64,

    /// Floor used when the reference is near zero, and the rest threshold
    /// for current. Default: 0.001.
    pub absolute: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 0.01,
            absolute: 0.001,
        }
    }
}

impl Tolerance {
    /// Allowed deviation around `reference`.
    #[must_use]
    pub fn band(&self, reference: f64) -> f64 {
        (self.relative * reference.abs()).max(self.absolute)
    }

    #[must_use]
    pub fn matches(&self, value: f64, reference: f64) -> bool {
        (value - reference).abs() <= self.band(reference)
    }

    /// True when `current` is indistinguishable from zero.
    #[must_use]
    pub fn is_rest(&self, current: f64) -> bool {
        current.abs() <= self.absolute
    }
}

/// Configuration for segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub tolerance: Tolerance,

    /// Fewest rows a constant-current, -voltage or -power run may contain.
    /// Default: 2.
    pub min_run_rows: usize,

    /// Shortest elapsed time a constant run may cover, in seconds.
    /// Default: 0.0.
    pub min_run_duration_s: f64,

    /// A pulse must last strictly less than this, in seconds.
    /// Default: 360.0 (6 minutes).
    pub max_pulse_duration_s: f64,

    /// Largest relative change in current between consecutive rows of a CV
    /// hold. A bigger jump ends the hold. Default: 0.05 (5%).
    pub max_hold_current_step: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            min_run_rows: 2,
            min_run_duration_s: 0.0,
            max_pulse_duration_s: 360.0,
            max_hold_current_step: 0.05,
        }
    }
}
