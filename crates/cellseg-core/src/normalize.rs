//! Materialized sub-tables and elapsed-time re-zeroing.

use serde::Serialize;

use crate::record::{Record, Series};
use crate::segment::Segment;

/// An owned copy of a segment's rows.
///
/// `original_time` holds each row's time as it was in the source series and is
/// never shifted, so re-zeroing twice is the same as re-zeroing once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentTable {
    pub segment: Segment,
    pub rows: Vec<Record>,
    pub original_time: Vec<f64>,
}

impl SegmentTable {
    /// Copies `segment`'s rows out of `series`.
    #[must_use]
    pub fn from_segment(series: &Series, segment: &Segment) -> Self {
        let rows = segment.rows(series).to_vec();
        let original_time = rows.iter().map(|r| r.time).collect();
        Self {
            segment: *segment,
            rows,
            original_time,
        }
    }
}

/// Shifts time so the first row sits at zero, keeping inter-row spacing.
pub trait ResetTime {
    #[must_use]
    fn reset_time(&self) -> Self;
}

impl ResetTime for SegmentTable {
    fn reset_time(&self) -> Self {
        let offset = self.rows.first().map_or(0.0, |r| r.time);
        let rows = self
            .rows
            .iter()
            .map(|r| Record {
                time: r.time - offset,
                ..*r
            })
            .collect();
        Self {
            segment: self.segment,
            rows,
            original_time: self.original_time.clone(),
        }
    }
}

impl ResetTime for Vec<SegmentTable> {
    fn reset_time(&self) -> Self {
        self.iter().map(ResetTime::reset_time).collect()
    }
}
