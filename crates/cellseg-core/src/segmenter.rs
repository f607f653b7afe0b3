//! One series, one configuration, many requests.

use serde::Serialize;
use tracing::debug;

use crate::adjacency::{self, RestNeighbors};
use crate::builder;
use crate::chain::{self, ChainMatch, ChainOrder};
use crate::condition::Condition;
use crate::config::SegmentConfig;
use crate::error::SegmentError;
use crate::normalize::{ResetTime, SegmentTable};
use crate::query;
use crate::record::Series;
use crate::segment::{Segment, SegmentCollection};

/// Results of one request string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub request: String,
    pub matches: Vec<ChainMatch>,
    /// One sub-table per match, spanning every stage of the chain.
    pub tables: Vec<SegmentTable>,
}

/// Runs segmentation requests against a borrowed series.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter<'a> {
    series: &'a Series,
    config: SegmentConfig,
    order: ChainOrder,
}

impl<'a> Segmenter<'a> {
    /// Fails with [`SegmentError::EmptySeries`] for a zero-row series.
    pub fn new(series: &'a Series, config: SegmentConfig) -> Result<Self, SegmentError> {
        series.ensure_non_empty()?;
        Ok(Self {
            series,
            config,
            order: ChainOrder::default(),
        })
    }

    /// Sets the direction used to link chained conditions.
    #[must_use]
    pub const fn with_order(mut self, order: ChainOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn series(&self) -> &'a Series {
        self.series
    }

    #[must_use]
    pub const fn config(&self) -> &SegmentConfig {
        &self.config
    }

    pub fn build(&self, condition: &Condition) -> Result<SegmentCollection, SegmentError> {
        builder::build(self.series, condition, &self.config)
    }

    /// Parses and resolves one request. A single condition yields one-stage matches.
    pub fn query(&self, request: &str) -> Result<Vec<ChainMatch>, SegmentError> {
        let conditions = query::parse(request)?;
        if let [condition] = conditions.as_slice() {
            return Ok(self
                .build(condition)?
                .into_iter()
                .map(ChainMatch::single)
                .collect());
        }
        chain::resolve(self.series, &conditions, self.order, &self.config)
    }

    /// Runs every request in order, stopping at the first malformed one.
    ///
    /// With `reset`, each table's time starts at zero.
    pub fn segment<S: AsRef<str>>(
        &self,
        requests: &[S],
        reset: bool,
    ) -> Result<Vec<RequestOutcome>, SegmentError> {
        requests
            .iter()
            .map(|request| {
                let request = request.as_ref();
                let matches = self.query(request)?;
                let tables = self.tables(matches.iter().map(ChainMatch::merged));
                let tables = if reset { tables.reset_time() } else { tables };
                debug!(request, matches = matches.len(), reset, "segmented request");
                Ok(RequestOutcome {
                    request: request.to_string(),
                    matches,
                    tables,
                })
            })
            .collect()
    }

    /// Materializes owned sub-tables for `segments`.
    pub fn tables<I>(&self, segments: I) -> Vec<SegmentTable>
    where
        I: IntoIterator<Item = Segment>,
    {
        segments
            .into_iter()
            .map(|segment| SegmentTable::from_segment(self.series, &segment))
            .collect()
    }

    pub fn find_rest<'s, I>(&self, segments: I) -> Result<SegmentCollection, SegmentError>
    where
        I: IntoIterator<Item = &'s Segment>,
    {
        adjacency::find_rest(self.series, segments, &self.config)
    }

    pub fn rest_neighbors<'s, I>(&self, segments: I) -> Result<Vec<RestNeighbors>, SegmentError>
    where
        I: IntoIterator<Item = &'s Segment>,
    {
        adjacency::rest_neighbors(self.series, segments, &self.config)
    }

    pub fn extend_with_rest(&self, segment: &Segment) -> Result<Segment, SegmentError> {
        adjacency::extend_with_rest(self.series, segment, &self.config)
    }
}
