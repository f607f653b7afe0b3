//! Rest command for listing rest periods around each match of a request.

use std::fmt::Write;

use anyhow::{Context, Result};
use cellseg_core::{ChainMatch, RestNeighbors, Segment, SegmentConfig, Segmenter, Series};
use serde::Serialize;

/// Rest periods around one match, as row spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestEntry {
    pub segment: (usize, usize),
    pub before: Option<(usize, usize)>,
    pub after: Option<(usize, usize)>,
}

impl From<&RestNeighbors> for RestEntry {
    fn from(neighbors: &RestNeighbors) -> Self {
        let span = |s: &Segment| (s.start, s.end);
        Self {
            segment: span(&neighbors.segment),
            before: neighbors.before.as_ref().map(span),
            after: neighbors.after.as_ref().map(span),
        }
    }
}

/// Finds the rest neighbours of every match of `request`.
pub fn collect_rest(
    series: &Series,
    config: &SegmentConfig,
    request: &str,
) -> Result<Vec<RestEntry>> {
    let segmenter = Segmenter::new(series, *config)?;
    let merged: Vec<Segment> = segmenter
        .query(request)?
        .iter()
        .map(ChainMatch::merged)
        .collect();
    let neighbors = segmenter
        .rest_neighbors(&merged)
        .with_context(|| format!("failed to find rest around {request:?}"))?;
    Ok(neighbors.iter().map(RestEntry::from).collect())
}

fn format_span(span: Option<(usize, usize)>) -> String {
    span.map_or_else(|| "-".to_string(), |(start, end)| format!("{start}-{end}"))
}

/// Format rest neighbours for human-readable output.
pub fn format_rest(request: &str, entries: &[RestEntry]) -> String {
    let mut output = String::new();

    writeln!(output, "REST AROUND {request:?}").unwrap();
    if entries.is_empty() {
        writeln!(output, "  No segments matched.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:>3}  {:>11}  {:>11}  {:>11}",
        "#", "Rows", "Before", "After"
    )
    .unwrap();
    for (n, entry) in entries.iter().enumerate() {
        writeln!(
            output,
            "{:>3}  {:>11}  {:>11}  {:>11}",
            n + 1,
            format_span(Some(entry.segment)),
            format_span(entry.before),
            format_span(entry.after)
        )
        .unwrap();
    }

    output
}

/// Runs the rest command.
pub fn run(series: &Series, config: &SegmentConfig, request: &str, json: bool) -> Result<()> {
    let entries = collect_rest(series, config, request)?;

    if json {
        let out = serde_json::to_string_pretty(&entries).context("failed to serialize rest")?;
        println!("{out}");
    } else {
        print!("{}", format_rest(request, &entries));
    }
    Ok(())
}
