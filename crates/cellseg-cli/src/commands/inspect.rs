//! Inspect command: series shape plus segment counts per regime.

use std::fmt::Write;

use anyhow::{Context, Result};
use cellseg_core::{Condition, Regime, SegmentConfig, Segmenter, Series, SeriesSummary};
use serde::Serialize;

/// Regimes counted by `inspect`, without targets.
const SURVEY: [Condition; 8] = [
    Condition::Rest,
    Condition::Charge { current: None },
    Condition::Discharge { current: None },
    Condition::ConstantCurrent { current: None },
    Condition::ConstantVoltage { voltage: None },
    Condition::ConstantPower { power: None },
    Condition::Cccv {
        current: None,
        voltage: None,
    },
    Condition::Pulse { current: None },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeCount {
    pub regime: Regime,
    pub segments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub summary: SeriesSummary,
    pub regimes: Vec<RegimeCount>,
}

pub fn collect_inspect(series: &Series, config: &SegmentConfig) -> Result<InspectReport> {
    let segmenter = Segmenter::new(series, *config)?;
    let summary = series.summary().context("series is empty")?;
    let regimes = SURVEY
        .iter()
        .map(|condition| {
            Ok(RegimeCount {
                regime: condition.regime(),
                segments: segmenter.build(condition)?.len(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(InspectReport { summary, regimes })
}

pub fn format_inspect(report: &InspectReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    writeln!(output, "SERIES").unwrap();
    writeln!(output, "  Rows:   {}", summary.rows).unwrap();
    writeln!(
        output,
        "  Time:   {:.3} .. {:.3} s ({:.3} s)",
        summary.start_time,
        summary.end_time,
        summary.duration()
    )
    .unwrap();
    writeln!(output, "  Steps:  {} .. {}", summary.min_step, summary.max_step).unwrap();
    writeln!(output).unwrap();

    writeln!(output, "SEGMENTS").unwrap();
    for count in &report.regimes {
        writeln!(output, "  {:<10}  {:>5}", count.regime.keyword(), count.segments).unwrap();
    }

    output
}

/// Runs the inspect command.
pub fn run(series: &Series, config: &SegmentConfig, json: bool) -> Result<()> {
    let report = collect_inspect(series, config)?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
    } else {
        print!("{}", format_inspect(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellseg_core::Record;
    use insta::assert_snapshot;

    #[test]
    fn test_format_inspect() {
        let series: Series = [
            (0.0, 0.0, 1),
            (1.0, 0.0, 1),
            (2.0, 1.67, 2),
            (3.0, 1.67, 2),
            (4.0, 0.0, 3),
        ]
        .into_iter()
            .map(|(t, i, s)| Record::new(t, i, 3.7, s))
            .collect();
        let report = collect_inspect(&series, &SegmentConfig::default()).unwrap();

        assert_snapshot!(format_inspect(&report), @r"
        SERIES
          Rows:   5
          Time:   0.000 .. 4.000 s (4.000 s)
          Steps:  1 .. 3

        SEGMENTS
          rest            2
          charging        1
          dischg          0
          cc              1
          cv              0
          power           1
          cccv            0
          pulse           1
        ");
    }

    #[test]
    fn test_empty_series_is_an_error() {
        assert!(collect_inspect(&Series::default(), &SegmentConfig::default()).is_err());
    }
}
