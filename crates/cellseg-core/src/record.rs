//! Canonical per-row schema and the series that owns it.
//!
//! The import layer normalizes vendor exports into [`Record`]s. Everything downstream
//! borrows the [`Series`] and refers to rows by index; nothing here mutates it.

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;

/// One normalized cycler sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Elapsed test time in seconds, non-decreasing in file order.
    pub time: f64,

    /// Current in amperes. Positive charges the cell, negative discharges it.
    pub current: f64,

    /// Terminal voltage in volts.
    pub voltage: f64,

    /// Power in watts, `current * voltage` by convention.
    pub power: f64,

    /// Vendor step index. May repeat non-contiguously across a file.
    pub step: i64,
}

impl Record {
    /// Creates a record with power derived from current and voltage.
    #[must_use]
    pub fn new(time: f64, current: f64, voltage: f64, step: i64) -> Self {
        Self {
            time,
            current,
            voltage,
            power: current * voltage,
            step,
        }
    }
}

/// An ordered, immutable sequence of records in original file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Rows `start..=end`. Panics if the range is out of bounds.
    #[must_use]
    pub fn rows(&self, start: usize, end: usize) -> &[Record] {
        &self.records[start..=end]
    }

    /// Fails with [`SegmentError::EmptySeries`] when there are no rows.
    pub fn ensure_non_empty(&self) -> Result<(), SegmentError> {
        if self.records.is_empty() {
            Err(SegmentError::EmptySeries)
        } else {
            Ok(())
        }
    }

    /// True when step indices never decrease, so step ranges are contiguous.
    #[must_use]
    pub fn steps_are_monotonic(&self) -> bool {
        self.records.windows(2).all(|w| w[0].step <= w[1].step)
    }

    /// Summary statistics for display. `None` for an empty series.
    #[must_use]
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        let (min_step, max_step) = self
            .records
            .iter()
            .fold((first.step, first.step), |(lo, hi), r| {
                (lo.min(r.step), hi.max(r.step))
            });
        Some(SeriesSummary {
            rows: self.records.len(),
            start_time: first.time,
            end_time: last.time,
            min_step,
            max_step,
        })
    }
}

impl From<Vec<Record>> for Series {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for Series {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Shape of a series at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub rows: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub min_step: i64,
    pub max_step: i64,
}

impl SeriesSummary {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}
