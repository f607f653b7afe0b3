//! Rest periods touching a segment.

use serde::Serialize;

use crate::builder::build;
use crate::condition::Condition;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::record::Series;
use crate::segment::{Segment, SegmentCollection};

/// The rest segments directly before and after one input segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RestNeighbors {
    pub segment: Segment,
    /// Rest ending on the row before `segment.start`.
    pub before: Option<Segment>,
    /// Rest starting on the row after `segment.end`.
    pub after: Option<Segment>,
}

impl RestNeighbors {
    /// The segment widened to cover whichever neighbours exist.
    #[must_use]
    pub fn extended(&self) -> Segment {
        let start = self.before.map_or(self.segment.start, |r| r.start);
        let end = self.after.map_or(self.segment.end, |r| r.end);
        Segment::new(start, end, self.segment.condition)
    }
}

/// Looks up the adjacent rest segments of each input segment.
///
/// Rest is built once for the whole series; each lookup is a binary search.
pub fn rest_neighbors<'a, I>(
    series: &Series,
    segments: I,
    config: &SegmentConfig,
) -> Result<Vec<RestNeighbors>, SegmentError>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let rest = build(series, &Condition::Rest, config)?;
    Ok(segments
        .into_iter()
        .map(|segment| neighbors_in(&rest, *segment))
        .collect())
}

/// Every rest segment adjacent to any input segment, deduplicated and ordered.
pub fn find_rest<'a, I>(
    series: &Series,
    segments: I,
    config: &SegmentConfig,
) -> Result<SegmentCollection, SegmentError>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut found: Vec<Segment> = rest_neighbors(series, segments, config)?
        .into_iter()
        .flat_map(|n| [n.before, n.after])
        .flatten()
        .collect();
    found.sort_by_key(|s| s.start);
    found.dedup_by_key(|s| s.start);
    Ok(SegmentCollection::from_sorted(found))
}

/// `segment` widened by the rest periods on either side, if any.
pub fn extend_with_rest(
    series: &Series,
    segment: &Segment,
    config: &SegmentConfig,
) -> Result<Segment, SegmentError> {
    let neighbors = rest_neighbors(series, [segment], config)?;
    Ok(neighbors
        .first()
        .map_or(*segment, RestNeighbors::extended))
}

fn neighbors_in(rest: &SegmentCollection, segment: Segment) -> RestNeighbors {
    let before = segment
        .start
        .checked_sub(1)
        .and_then(|index| rest.ending_at(index))
        .copied();
    let after = rest.starting_at(segment.end + 1).copied();
    RestNeighbors {
        segment,
        before,
        after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn scenario() -> Series {
        [(0.0, 0.0), (1.0, 0.0), (2.0, 1.67), (3.0, 1.67), (4.0, 0.0)]
            .into_iter()
            .map(|(t, i)| Record::new(t, i, 3.7, 1))
            .collect()
    }

    fn cc(series: &Series) -> SegmentCollection {
        build(
            series,
            &Condition::ConstantCurrent {
                current: Some(1.67),
            },
            &SegmentConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn finds_rest_on_both_sides() {
        let series = scenario();
        let cc = cc(&series);
        let rest = find_rest(&series, &cc, &SegmentConfig::default()).unwrap();
        let spans: Vec<_> = rest.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(0, 1), (4, 4)]);
    }

    #[test]
    fn neighbors_keep_sides_apart() {
        let series = scenario();
        let cc = cc(&series);
        let neighbors = rest_neighbors(&series, &cc, &SegmentConfig::default()).unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].before.map(|s| (s.start, s.end)), Some((0, 1)));
        assert_eq!(neighbors[0].after.map(|s| (s.start, s.end)), Some((4, 4)));
    }

    #[test]
    fn missing_side_is_none() {
        let series: Series = [(0.0, 1.0), (1.0, 1.0), (2.0, 0.0)]
            .into_iter()
            .map(|(t, i)| Record::new(t, i, 3.7, 1))
            .collect();
        let charge = build(
            &series,
            &Condition::Charge { current: None },
            &SegmentConfig::default(),
        )
        .unwrap();
        let neighbors = rest_neighbors(&series, &charge, &SegmentConfig::default()).unwrap();
        assert!(neighbors[0].before.is_none());
        assert_eq!(neighbors[0].after.map(|s| s.start), Some(2));
    }

    #[test]
    fn extend_covers_adjacent_rest() {
        let series = scenario();
        let segment = cc(&series).into_vec()[0];
        let extended = extend_with_rest(&series, &segment, &SegmentConfig::default()).unwrap();
        assert_eq!((extended.start, extended.end), (0, 4));
    }

    #[test]
    fn empty_series_errors() {
        let result = find_rest(
            &Series::default(),
            std::iter::empty::<&Segment>(),
            &SegmentConfig::default(),
        );
        assert_eq!(result, Err(SegmentError::EmptySeries));
    }
}
