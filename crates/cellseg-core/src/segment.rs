//! Segments are index ranges into a borrowed [`Series`].

use serde::Serialize;

use crate::condition::Condition;
use crate::record::{Record, Series};
use crate::regime::Regime;

/// A contiguous, inclusive row range that satisfied one condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub regime: Regime,
    /// The condition this segment matched, echoed for chaining and adjacency.
    pub condition: Condition,
}

impl Segment {
    #[must_use]
    pub const fn new(start: usize, end: usize, condition: Condition) -> Self {
        debug_assert!(start <= end);
        Self {
            start,
            end,
            regime: condition.regime(),
            condition,
        }
    }

    /// Row count. Never zero.
    #[must_use]
    #[expect(
        clippy::len_without_is_empty,
        reason = "a segment always covers at least one row"
    )]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Borrowed view of the segment's rows.
    #[must_use]
    pub fn rows<'a>(&self, series: &'a Series) -> &'a [Record] {
        series.rows(self.start, self.end)
    }

    /// Elapsed time from the first to the last row.
    #[must_use]
    pub fn duration(&self, series: &Series) -> f64 {
        let rows = self.rows(series);
        rows[rows.len() - 1].time - rows[0].time
    }

    /// True when `other` starts on the row right after this one ends.
    #[must_use]
    pub const fn is_followed_by(&self, other: &Self) -> bool {
        self.end + 1 == other.start
    }
}

/// Non-overlapping segments ordered by `start`, produced by one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SegmentCollection {
    segments: Vec<Segment>,
}

impl SegmentCollection {
    /// Wraps segments that the caller guarantees are sorted and disjoint.
    pub(crate) fn from_sorted(segments: Vec<Segment>) -> Self {
        debug_assert!(segments.windows(2).all(|w| w[0].end < w[1].start));
        Self { segments }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Segment> {
        self.segments
    }

    /// The segment whose first row is `index`, found by binary search.
    #[must_use]
    pub fn starting_at(&self, index: usize) -> Option<&Segment> {
        self.segments
            .binary_search_by_key(&index, |s| s.start)
            .ok()
            .map(|i| &self.segments[i])
    }

    /// The segment whose last row is `index`. Ends are sorted because segments
    /// are disjoint and ordered.
    #[must_use]
    pub fn ending_at(&self, index: usize) -> Option<&Segment> {
        self.segments
            .binary_search_by_key(&index, |s| s.end)
            .ok()
            .map(|i| &self.segments[i])
    }
}

impl IntoIterator for SegmentCollection {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a SegmentCollection {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
