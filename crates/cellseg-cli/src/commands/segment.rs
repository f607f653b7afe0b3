//! Segment command.
//!
//! This module implements `cellseg segment`, which runs each request against the
//! loaded series and lists the matching row ranges.

use std::fmt::Write;

use anyhow::{Context, Result};
use cellseg_core::{
    ChainMatch, ChainOrder, RequestOutcome, ResetTime, SegmentConfig, SegmentTable, Segmenter,
    Series,
};
use serde::Serialize;

/// Flags that shape how matches are reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentOptions {
    pub reset_time: bool,
    pub with_rest: bool,
    pub preceding: bool,
    pub json: bool,
}

// ========== Report Data ==========

/// One reported match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentEntry {
    pub start: usize,
    pub end: usize,
    pub rows: usize,
    pub start_time: f64,
    pub end_time: f64,
    /// Source time of the first row, unaffected by `--reset-time`.
    pub original_start_time: f64,
    pub stages: Vec<String>,
}

impl SegmentEntry {
    fn new(chain: &ChainMatch, table: &SegmentTable) -> Self {
        let first = table.rows.first().map_or(0.0, |r| r.time);
        let last = table.rows.last().map_or(0.0, |r| r.time);
        Self {
            start: table.segment.start,
            end: table.segment.end,
            rows: table.rows.len(),
            start_time: first,
            end_time: last,
            original_start_time: table.original_time.first().copied().unwrap_or(first),
            stages: chain
                .segments()
                .iter()
                .map(|s| s.condition.to_string())
                .collect(),
        }
    }

    fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// All matches of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestReport {
    pub request: String,
    pub segments: Vec<SegmentEntry>,
}

/// Runs `requests` and collects their reports.
pub fn collect_reports(
    series: &Series,
    config: &SegmentConfig,
    requests: &[String],
    options: SegmentOptions,
) -> Result<Vec<RequestReport>> {
    let order = if options.preceding {
        ChainOrder::Preceding
    } else {
        ChainOrder::Following
    };
    let segmenter = Segmenter::new(series, *config)?.with_order(order);

    let mut outcomes = segmenter.segment(requests, options.reset_time && !options.with_rest)?;
    if options.with_rest {
        for outcome in &mut outcomes {
            widen_with_rest(&segmenter, outcome, options.reset_time)?;
        }
    }

    Ok(outcomes
        .iter()
        .map(|outcome| RequestReport {
            request: outcome.request.clone(),
            segments: outcome
                .matches
                .iter()
                .zip(&outcome.tables)
                .map(|(chain, table)| SegmentEntry::new(chain, table))
                .collect(),
        })
        .collect())
}

fn widen_with_rest(
    segmenter: &Segmenter<'_>,
    outcome: &mut RequestOutcome,
    reset_time: bool,
) -> Result<()> {
    let widened = outcome
        .matches
        .iter()
        .map(|chain| segmenter.extend_with_rest(&chain.merged()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to extend {:?} with rest", outcome.request))?;
    let tables = segmenter.tables(widened);
    outcome.tables = if reset_time {
        tables.reset_time()
    } else {
        tables
    };
    Ok(())
}

// ========== Human-Readable Output ==========

/// Format reports for human-readable output.
pub fn format_reports(reports: &[RequestReport]) -> String {
    let mut output = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        let noun = if report.segments.len() == 1 {
            "match"
        } else {
            "matches"
        };
        writeln!(
            output,
            "REQUEST {:?} ({} {noun})",
            report.request,
            report.segments.len()
        )
        .unwrap();

        if report.segments.is_empty() {
            writeln!(output, "  No segments matched.").unwrap();
            continue;
        }

        writeln!(
            output,
            "{:>3}  {:>11}  {:>5}  {:>10}  {:>10}  {:>10}  Stages",
            "#", "Rows", "Count", "Start [s]", "End [s]", "Dur [s]"
        )
        .unwrap();
        for (n, entry) in report.segments.iter().enumerate() {
            let span = format!("{}-{}", entry.start, entry.end);
            writeln!(
                output,
                "{:>3}  {:>11}  {:>5}  {:>10.3}  {:>10.3}  {:>10.3}  {}",
                n + 1,
                span,
                entry.rows,
                entry.start_time,
                entry.end_time,
                entry.duration(),
                entry.stages.join(", ")
            )
            .unwrap();
        }
    }

    output
}

// ========== JSON Output ==========

/// Format reports as JSON.
pub fn format_reports_json(reports: &[RequestReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("failed to serialize segments")
}

// ========== Command Entry Point ==========

/// Runs the segment command.
pub fn run(
    series: &Series,
    config: &SegmentConfig,
    requests: &[String],
    options: SegmentOptions,
) -> Result<()> {
    let reports = collect_reports(series, config, requests, options)?;
    tracing::debug!(requests = requests.len(), "segmentation complete");

    if options.json {
        println!("{}", format_reports_json(&reports)?);
    } else {
        print!("{}", format_reports(&reports));
    }
    Ok(())
}
