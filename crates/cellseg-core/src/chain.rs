//! Chain resolution: ordered conditions whose segments must touch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::build;
use crate::condition::Condition;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::record::Series;
use crate::segment::{Segment, SegmentCollection};

/// Which side of the previous stage each next stage must sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainOrder {
    /// Stage `i + 1` starts on the row after stage `i` ends.
    #[default]
    Following,
    /// Stage `i + 1` ends on the row before stage `i` starts.
    Preceding,
}

/// One resolved chain: a segment per condition, in condition order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainMatch {
    segments: Vec<Segment>,
}

impl ChainMatch {
    /// Wraps a single segment as a one-stage chain.
    #[must_use]
    pub fn single(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First and last row covered by the whole chain.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        let start = self.segments.iter().map(|s| s.start).min().unwrap_or(0);
        let end = self.segments.iter().map(|s| s.end).max().unwrap_or(0);
        (start, end)
    }

    /// The chain's rows as one segment tagged with the first stage's condition.
    #[must_use]
    pub fn merged(&self) -> Segment {
        let (start, end) = self.span();
        Segment::new(start, end, self.segments[0].condition)
    }
}

/// Finds every run of index-adjacent segments satisfying `conditions` in order.
///
/// Each condition is built independently; stages are then linked by binary search
/// on the next stage's sorted boundaries. Results follow the first stage's order.
pub fn resolve(
    series: &Series,
    conditions: &[Condition],
    order: ChainOrder,
    config: &SegmentConfig,
) -> Result<Vec<ChainMatch>, SegmentError> {
    let Some((head, rest)) = conditions.split_first() else {
        return Err(SegmentError::MalformedRequest {
            request: String::new(),
            reason: "chain has no conditions".to_string(),
        });
    };

    let first = build(series, head, config)?;
    let stages = rest
        .iter()
        .map(|condition| build(series, condition, config))
        .collect::<Result<Vec<_>, _>>()?;

    let matches: Vec<ChainMatch> = first
        .iter()
        .filter_map(|&start| link(start, &stages, order))
        .collect();

    debug!(
        stages = conditions.len(),
        candidates = first.len(),
        matches = matches.len(),
        ?order,
        "resolved chain"
    );
    Ok(matches)
}

fn link(start: Segment, stages: &[SegmentCollection], order: ChainOrder) -> Option<ChainMatch> {
    let mut segments = Vec::with_capacity(stages.len() + 1);
    segments.push(start);
    let mut current = start;
    for stage in stages {
        let next = match order {
            ChainOrder::Following => stage.starting_at(current.end + 1),
            ChainOrder::Preceding => current
                .start
                .checked_sub(1)
                .and_then(|index| stage.ending_at(index)),
        }?;
        segments.push(*next);
        current = *next;
    }
    Some(ChainMatch { segments })
}
