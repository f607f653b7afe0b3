//! Segment builder.
//!
//! Turns a [`Condition`] into a [`SegmentCollection`] with a single left-to-right
//! scan of the series. No index survives between requests.
//!
//! # Run detection
//!
//! 1. Rest / charge / discharge group consecutive rows of equal [`Polarity`]
//! 2. CC, CV and CP grow a run while each new row stays within tolerance of the
//!    run's running mean, never across rest rows or a polarity flip
//! 3. CV holds are found first: voltage held within tolerance while current and
//!    power both drift past tolerance from the hold's first row, with no row-to-row
//!    current jump above `max_hold_current_step`. Hold rows are never CC or CP
//! 4. CC is detected next over the remaining rows; plain CV runs only consider rows
//!    neither a hold nor a CC run claimed, so a row on a stepped CC/CV boundary
//!    belongs to the CC run
//! 5. Runs shorter than `min_run_rows` / `min_run_duration_s` are dropped
//! 6. With a target, a run is trimmed to its maximal sub-ranges of matching rows
//!
//! CCCV and pulses are composed from the CC and CV runs rather than classified per row.

use tracing::debug;

use crate::condition::{Condition, Interval};
use crate::config::{SegmentConfig, Tolerance};
use crate::error::SegmentError;
use crate::record::{Record, Series};
use crate::regime::{Polarity, Quantity, Regime, classify_row};
use crate::segment::{Segment, SegmentCollection};

/// A closed run of rows sharing one regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Run {
    pub start: usize,
    pub end: usize,
    /// Mean of the tracked quantity over the run.
    pub mean: f64,
    pub polarity: Polarity,
}

/// A run still accepting rows. The mean is kept incrementally.
struct OpenRun {
    start: usize,
    end: usize,
    sum: f64,
    count: usize,
    polarity: Polarity,
}

impl OpenRun {
    const fn open(index: usize, value: f64, polarity: Polarity) -> Self {
        Self {
            start: index,
            end: index,
            sum: value,
            count: 1,
            polarity,
        }
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    fn accepts(&self, value: f64, polarity: Polarity, tolerance: &Tolerance) -> bool {
        self.polarity == polarity && tolerance.matches(value, self.mean())
    }

    fn push(&mut self, index: usize, value: f64) {
        self.end = index;
        self.sum += value;
        self.count += 1;
    }

    fn close(&self) -> Run {
        Run {
            start: self.start,
            end: self.end,
            mean: self.mean(),
            polarity: self.polarity,
        }
    }
}

/// Builds every segment of `series` matching `condition`.
///
/// Returns [`SegmentError::EmptySeries`] for a zero-row series. A condition with no
/// qualifying rows yields an empty collection.
pub fn build(
    series: &Series,
    condition: &Condition,
    config: &SegmentConfig,
) -> Result<SegmentCollection, SegmentError> {
    series.ensure_non_empty()?;
    let tolerance = &config.tolerance;

    let segments = match *condition {
        Condition::Step { range } => step_segments(series, range, condition),
        Condition::Time { range } => time_segments(series, range, condition),
        Condition::Rest => polarity_runs(series, tolerance)
            .into_iter()
            .filter(|run| run.polarity == Polarity::Rest)
            .map(|run| Segment::new(run.start, run.end, *condition))
            .collect(),
        Condition::Charge { current } | Condition::Discharge { current } => {
            let wanted = if condition.regime() == Regime::Charge {
                Polarity::Charge
            } else {
                Polarity::Discharge
            };
            let runs: Vec<Run> = polarity_runs(series, tolerance)
                .into_iter()
                .filter(|run| run.polarity == wanted)
                .collect();
            trim_to_target(series, &runs, condition, current, tolerance)
        }
        Condition::ConstantCurrent { current } => {
            let runs = cc_cv_runs(series, config).0;
            trim_to_target(series, &runs, condition, current, tolerance)
        }
        Condition::ConstantVoltage { voltage } => {
            let runs = cc_cv_runs(series, config).1;
            trim_to_target(series, &runs, condition, voltage, tolerance)
        }
        Condition::ConstantPower { power } => {
            let claimed = claim(series, &hold_runs(series, config));
            let runs = constant_runs(series, Quantity::Power, Some(&claimed), config);
            trim_to_target(series, &runs, condition, power, tolerance)
        }
        Condition::Cccv { current, voltage } => {
            cccv_segments(series, condition, current, voltage, config)
        }
        Condition::Pulse { current } => pulse_segments(series, condition, current, config),
    };

    debug!(
        request = %condition,
        rows = series.len(),
        segments = segments.len(),
        "built segments"
    );
    Ok(SegmentCollection::from_sorted(segments))
}

/// Groups consecutive rows of equal polarity. Never empty for a non-empty series.
pub(crate) fn polarity_runs(series: &Series, tolerance: &Tolerance) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;

    for (index, record) in series.records().iter().enumerate() {
        let polarity = Polarity::of(record, tolerance);
        match open.as_mut() {
            Some(run) if run.polarity == polarity => run.push(index, record.current),
            _ => {
                if let Some(run) = open.take() {
                    runs.push(run.close());
                }
                open = Some(OpenRun::open(index, record.current, polarity));
            }
        }
    }
    if let Some(run) = open {
        runs.push(run.close());
    }
    runs
}

/// Runs over which `quantity` holds near its running mean.
///
/// Rest rows and rows flagged in `claimed` never join a run.
pub(crate) fn constant_runs(
    series: &Series,
    quantity: Quantity,
    claimed: Option<&[bool]>,
    config: &SegmentConfig,
) -> Vec<Run> {
    let tolerance = &config.tolerance;
    let records = series.records();
    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;

    let close = |run: &OpenRun, runs: &mut Vec<Run>| {
        if long_enough(records, run, config) {
            runs.push(run.close());
        }
    };

    for (index, record) in records.iter().enumerate() {
        let value = quantity.of(record);
        let polarity = Polarity::of(record, tolerance);
        let eligible =
            polarity != Polarity::Rest && !claimed.is_some_and(|mask| mask[index]);

        if let Some(run) = open.as_mut() {
            if eligible && run.accepts(value, polarity, tolerance) {
                run.push(index, value);
                continue;
            }
        }
        if let Some(run) = open.take() {
            close(&run, &mut runs);
        }
        if eligible {
            open = Some(OpenRun::open(index, value, polarity));
        }
    }
    if let Some(run) = open.take() {
        close(&run, &mut runs);
    }
    runs
}

fn long_enough(records: &[Record], run: &OpenRun, config: &SegmentConfig) -> bool {
    run.count >= config.min_run_rows
        && records[run.end].time - records[run.start].time >= config.min_run_duration_s
}

/// Marks every row covered by `runs`.
fn claim(series: &Series, runs: &[Run]) -> Vec<bool> {
    let mut claimed = vec![false; series.len()];
    for run in runs {
        claimed[run.start..=run.end].fill(true);
    }
    claimed
}

/// Voltage-held stretches whose current decays smoothly, as in the tail of a
/// CCCV charge. Current and power must each end outside the tolerance band
/// around their value on the first row; a flat-current or constant-power
/// stretch is left to the CC and CP scans.
fn hold_runs(series: &Series, config: &SegmentConfig) -> Vec<Run> {
    let tolerance = &config.tolerance;
    let records = series.records();
    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;

    let close = |run: &OpenRun, runs: &mut Vec<Run>| {
        let first = &records[run.start];
        let last = &records[run.end];
        let drifted = !tolerance.matches(last.current, first.current)
            && !tolerance.matches(last.power, first.power);
        if drifted && long_enough(records, run, config) {
            runs.push(run.close());
        }
    };

    for (index, record) in records.iter().enumerate() {
        let polarity = Polarity::of(record, tolerance);
        let eligible = polarity != Polarity::Rest;

        if let Some(run) = open.as_mut() {
            let previous = records[run.end].current;
            let smooth = (record.current - previous).abs()
                <= config.max_hold_current_step * previous.abs();
            if eligible && smooth && run.accepts(record.voltage, polarity, tolerance) {
                run.push(index, record.voltage);
                continue;
            }
        }
        if let Some(run) = open.take() {
            close(&run, &mut runs);
        }
        if eligible {
            open = Some(OpenRun::open(index, record.voltage, polarity));
        }
    }
    if let Some(run) = open.take() {
        close(&run, &mut runs);
    }
    runs
}

/// CC and CV runs with no row in both.
///
/// Holds claim their rows first, CC runs grow over what is left, and plain CV
/// runs take rows neither claimed. The CV list merges holds and plain runs.
pub(crate) fn cc_cv_runs(series: &Series, config: &SegmentConfig) -> (Vec<Run>, Vec<Run>) {
    let holds = hold_runs(series, config);
    let mut claimed = claim(series, &holds);
    let cc = constant_runs(series, Quantity::Current, Some(&claimed), config);
    for run in &cc {
        claimed[run.start..=run.end].fill(true);
    }
    let mut cv = constant_runs(series, Quantity::Voltage, Some(&claimed), config);
    cv.extend(holds);
    cv.sort_by_key(|run| run.start);
    debug!(cc = cc.len(), cv = cv.len(), "detected constant runs");
    (cc, cv)
}

/// Emits each run whole, or its maximal sub-ranges matching `target`.
fn trim_to_target(
    series: &Series,
    runs: &[Run],
    condition: &Condition,
    target: Option<f64>,
    tolerance: &Tolerance,
) -> Vec<Segment> {
    let Some(target) = target else {
        return runs
            .iter()
            .map(|run| Segment::new(run.start, run.end, *condition))
            .collect();
    };

    let regime = condition.regime();
    let mut segments = Vec::new();
    for run in runs {
        let mut piece_start: Option<usize> = None;
        for index in run.start..=run.end {
            let record = &series.records()[index];
            let hit = classify_row(record, regime, Some(target), tolerance);
            match (hit, piece_start) {
                (true, None) => piece_start = Some(index),
                (false, Some(start)) => {
                    segments.push(Segment::new(start, index - 1, *condition));
                    piece_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = piece_start {
            segments.push(Segment::new(start, run.end, *condition));
        }
    }
    segments
}

fn cccv_segments(
    series: &Series,
    condition: &Condition,
    current: Option<f64>,
    voltage: Option<f64>,
    config: &SegmentConfig,
) -> Vec<Segment> {
    let tolerance = &config.tolerance;
    let (cc, cv) = cc_cv_runs(series, config);

    cc.iter()
        .filter_map(|cc_run| {
            let next = cv
                .binary_search_by_key(&(cc_run.end + 1), |run| run.start)
                .ok()
                .map(|i| &cv[i])?;
            let same_direction = next.polarity == cc_run.polarity;
            let current_ok = current.is_none_or(|a| tolerance.matches(cc_run.mean, a));
            let voltage_ok = voltage.is_none_or(|v| tolerance.matches(next.mean, v));
            (same_direction && current_ok && voltage_ok)
                .then(|| Segment::new(cc_run.start, next.end, *condition))
        })
        .collect()
}

fn pulse_segments(
    series: &Series,
    condition: &Condition,
    current: Option<f64>,
    config: &SegmentConfig,
) -> Vec<Segment> {
    let tolerance = &config.tolerance;
    let records = series.records();
    let (cc, cv) = cc_cv_runs(series, config);

    // A pulse edge is the series boundary, a rest row, or a step change.
    let isolated = |edge: &Record, neighbor: Option<&Record>| {
        neighbor.is_none_or(|n| tolerance.is_rest(n.current) || n.step != edge.step)
    };

    cc.iter()
        .filter(|run| {
            let duration = records[run.end].time - records[run.start].time;
            let before = run.start.checked_sub(1).map(|i| &records[i]);
            let after = records.get(run.end + 1);
            let into_cv = cv
                .binary_search_by_key(&(run.end + 1), |r| r.start)
                .is_ok();
            let target_ok = current.is_none_or(|a| {
                Polarity::of_target(a) == run.polarity && tolerance.matches(run.mean, a)
            });

            duration < config.max_pulse_duration_s
                && isolated(&records[run.start], before)
                && isolated(&records[run.end], after)
                && !into_cv
                && target_ok
        })
        .map(|run| Segment::new(run.start, run.end, *condition))
        .collect()
}

fn step_segments(
    series: &Series,
    range: Option<Interval<i64>>,
    condition: &Condition,
) -> Vec<Segment> {
    let records = series.records();
    let last = records.len() - 1;
    let Some(range) = range else {
        return vec![Segment::new(0, last, *condition)];
    };

    let max_step = records.iter().map(|r| r.step).max().unwrap_or_default();
    let (lo, hi) = if range.first() > max_step {
        (max_step, max_step)
    } else {
        (range.first(), range.last().min(max_step))
    };

    if series.steps_are_monotonic() {
        let start = records.partition_point(|r| r.step < lo);
        let end = records.partition_point(|r| r.step <= hi);
        return if start < end {
            vec![Segment::new(start, end - 1, *condition)]
        } else {
            Vec::new()
        };
    }

    debug!(lo, hi, "step indices repeat; splitting into contiguous runs");
    contiguous_where(records, condition, |r| lo <= r.step && r.step <= hi)
}

fn time_segments(
    series: &Series,
    range: Option<Interval<f64>>,
    condition: &Condition,
) -> Vec<Segment> {
    let records = series.records();
    let last = records.len() - 1;
    let Some(range) = range else {
        return vec![Segment::new(0, last, *condition)];
    };

    let end_time = records[last].time;
    let (lo, hi) = if range.first() > end_time {
        (end_time, end_time)
    } else if range.first() >= range.last() {
        (range.first(), range.first() + 1.0)
    } else {
        (range.first(), range.last())
    };

    let start = records.partition_point(|r| r.time < lo);
    let end = records.partition_point(|r| r.time <= hi);
    if start < end {
        vec![Segment::new(start, end - 1, *condition)]
    } else {
        Vec::new()
    }
}

/// Maximal contiguous row ranges satisfying `keep`.
fn contiguous_where(
    records: &[Record],
    condition: &Condition,
    keep: impl Fn(&Record) -> bool,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut open: Option<usize> = None;
    for (index, record) in records.iter().enumerate() {
        match (keep(record), open) {
            (true, None) => open = Some(index),
            (false, Some(start)) => {
                segments.push(Segment::new(start, index - 1, *condition));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        segments.push(Segment::new(start, records.len() - 1, *condition));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(rows: &[(f64, f64, f64, i64)]) -> Series {
        rows.iter()
            .map(|&(t, i, v, s)| Record::new(t, i, v, s))
            .collect()
    }

    /// rest, rest, CC 1.67 A, CC 1.67 A, rest
    fn scenario() -> Series {
        series_of(&[
            (0.0, 0.0, 3.70, 1),
            (1.0, 0.0, 3.70, 1),
            (2.0, 1.67, 3.80, 2),
            (3.0, 1.67, 3.81, 2),
            (4.0, 0.0, 3.75, 3),
        ])
    }

    /// rest, CC charge at 1 A, CV hold at 4.2 V with decaying current, rest.
    fn cccv_charge() -> Series {
        series_of(&[
            (0.0, 0.0, 3.60, 1),
            (1.0, 0.0, 3.60, 1),
            (2.0, 1.0, 3.90, 2),
            (3.0, 1.0, 4.00, 2),
            (4.0, 1.0, 4.10, 2),
            (5.0, 0.8, 4.20, 3),
            (6.0, 0.5, 4.20, 3),
            (7.0, 0.3, 4.20, 3),
            (8.0, 0.0, 4.10, 4),
            (9.0, 0.0, 4.10, 4),
        ])
    }

    /// Sampled at 1 s: 3 rest rows, 60 s CC at 1 A with voltage rising to 4.1 V,
    /// 300 s held at 4.2 V with current decaying as exp(-t / 300), 3 rest rows.
    fn dense_cccv_charge() -> Series {
        let rest = |t: i32| Record::new(f64::from(t), 0.0, 3.6, 1);
        (0..3)
            .map(rest)
            .chain((0..60).map(|k: i32| {
                let voltage = 0.5f64.mul_add(f64::from(k) / 59.0, 3.6);
                Record::new(f64::from(3 + k), 1.0, voltage, 2)
            }))
            .chain((0..300).map(|k: i32| {
                let current = (-f64::from(k) / 300.0).exp();
                Record::new(f64::from(63 + k), current, 4.2, 3)
            }))
            .chain((363..366).map(rest))
            .collect()
    }

    fn spans(collection: &SegmentCollection) -> Vec<(usize, usize)> {
        collection.iter().map(|s| (s.start, s.end)).collect()
    }

    fn build_default(series: &Series, condition: Condition) -> SegmentCollection {
        build(series, &condition, &SegmentConfig::default()).unwrap()
    }

    #[test]
    fn empty_series_errors() {
        let result = build(&Series::default(), &Condition::Rest, &SegmentConfig::default());
        assert_eq!(result, Err(SegmentError::EmptySeries));
    }

    #[test]
    fn rest_segments_from_scenario() {
        let rest = build_default(&scenario(), Condition::Rest);
        assert_eq!(spans(&rest), vec![(0, 1), (4, 4)]);
        assert!(rest.iter().all(|s| s.regime == Regime::Rest));
    }

    #[test]
    fn cc_with_target_from_scenario() {
        let cc = build_default(
            &scenario(),
            Condition::ConstantCurrent {
                current: Some(1.67),
            },
        );
        assert_eq!(spans(&cc), vec![(2, 3)]);
    }

    #[test]
    fn cc_target_is_subset_of_untargeted_cc() {
        let series = series_of(&[
            (0.0, 0.0, 3.7, 1),
            (1.0, 1.67, 3.8, 2),
            (2.0, 1.67, 3.8, 2),
            (3.0, 0.5, 3.8, 3),
            (4.0, 0.5, 3.8, 3),
            (5.0, 1.67, 3.9, 4),
            (6.0, 1.66, 3.9, 4),
        ]);
        let tol = Tolerance::default();
        let all = build_default(&series, Condition::ConstantCurrent { current: None });
        let targeted = build_default(
            &series,
            Condition::ConstantCurrent {
                current: Some(1.67),
            },
        );
        assert_eq!(spans(&all), vec![(1, 2), (3, 4), (5, 6)]);
        assert_eq!(spans(&targeted), vec![(1, 2), (5, 6)]);
        for seg in &targeted {
            assert!(all.iter().any(|s| s.start <= seg.start && seg.end <= s.end));
            assert!(seg.rows(&series).iter().all(|r| tol.matches(r.current, 1.67)));
        }
    }

    #[test]
    fn unmatched_target_is_empty_not_error() {
        let cc = build_default(&scenario(), Condition::ConstantCurrent { current: Some(3.0) });
        assert!(cc.is_empty());
    }

    #[test]
    fn charge_and_discharge_follow_sign() {
        let series = series_of(&[
            (0.0, 0.5, 3.8, 1),
            (1.0, 0.5, 3.9, 1),
            (2.0, 0.0, 3.9, 2),
            (3.0, -0.5, 3.7, 3),
            (4.0, -1.0, 3.6, 3),
        ]);
        let charge = build_default(&series, Condition::Charge { current: None });
        let discharge = build_default(&series, Condition::Discharge { current: None });
        assert_eq!(spans(&charge), vec![(0, 1)]);
        assert_eq!(spans(&discharge), vec![(3, 4)]);
        for seg in &discharge {
            assert!(seg.rows(&series).iter().all(|r| r.current < 0.0));
        }

        let at_one_amp = build_default(&series, Condition::Discharge { current: Some(1.0) });
        assert_eq!(spans(&at_one_amp), vec![(4, 4)]);
    }

    #[test]
    fn cv_excludes_rows_claimed_by_cc() {
        let cv = build_default(&cccv_charge(), Condition::ConstantVoltage { voltage: None });
        assert_eq!(spans(&cv), vec![(5, 7)]);

        let cv42 = build_default(
            &cccv_charge(),
            Condition::ConstantVoltage { voltage: Some(4.2) },
        );
        assert_eq!(spans(&cv42), vec![(5, 7)]);
    }

    #[test]
    fn cccv_joins_cc_and_following_cv() {
        let series = cccv_charge();
        let any = build_default(
            &series,
            Condition::Cccv {
                current: None,
                voltage: None,
            },
        );
        assert_eq!(spans(&any), vec![(2, 7)]);

        let both = build_default(
            &series,
            Condition::Cccv {
                current: Some(1.0),
                voltage: Some(4.2),
            },
        );
        assert_eq!(spans(&both), vec![(2, 7)]);

        let wrong_voltage = build_default(
            &series,
            Condition::Cccv {
                current: Some(1.0),
                voltage: Some(4.4),
            },
        );
        assert!(wrong_voltage.is_empty());

        let wrong_current = build_default(
            &series,
            Condition::Cccv {
                current: Some(2.0),
                voltage: None,
            },
        );
        assert!(wrong_current.is_empty());
    }

    #[test]
    fn decaying_cv_hold_is_one_cv_segment() {
        let series = dense_cccv_charge();
        let cc = build_default(&series, Condition::ConstantCurrent { current: None });
        let cv = build_default(&series, Condition::ConstantVoltage { voltage: None });
        assert_eq!(spans(&cc), vec![(3, 62)]);
        assert_eq!(spans(&cv), vec![(63, 362)]);

        let cv42 = build_default(&series, Condition::ConstantVoltage { voltage: Some(4.2) });
        assert_eq!(spans(&cv42), vec![(63, 362)]);
    }

    #[test]
    fn dense_cccv_spans_both_phases() {
        let series = dense_cccv_charge();
        let any = build_default(
            &series,
            Condition::Cccv {
                current: None,
                voltage: None,
            },
        );
        assert_eq!(spans(&any), vec![(3, 362)]);

        let both = build_default(
            &series,
            Condition::Cccv {
                current: Some(1.0),
                voltage: Some(4.2),
            },
        );
        assert_eq!(spans(&both), vec![(3, 362)]);

        let pulses = build_default(&series, Condition::Pulse { current: None });
        assert!(pulses.is_empty());
    }

    #[test]
    fn constant_power_skips_cv_hold() {
        let series = dense_cccv_charge();
        let cp = build_default(&series, Condition::ConstantPower { power: None });
        assert!(cp.iter().all(|s| s.end < 63));
    }

    #[test]
    fn current_staircase_at_flat_voltage_is_cc() {
        let series = series_of(&[
            (0.0, 1.0, 3.8, 1),
            (1.0, 1.0, 3.8, 1),
            (2.0, 0.5, 3.8, 2),
            (3.0, 0.5, 3.8, 2),
        ]);
        let cc = build_default(&series, Condition::ConstantCurrent { current: None });
        let cv = build_default(&series, Condition::ConstantVoltage { voltage: None });
        assert_eq!(spans(&cc), vec![(0, 1), (2, 3)]);
        assert!(cv.is_empty());
    }

    #[test]
    fn single_row_cc_is_dropped_unless_allowed() {
        let series = series_of(&[
            (0.0, 0.0, 3.7, 1),
            (1.0, 1.0, 3.8, 2),
            (2.0, 0.0, 3.7, 3),
        ]);
        let cc = Condition::ConstantCurrent { current: None };
        assert!(build_default(&series, cc).is_empty());

        let config = SegmentConfig {
            min_run_rows: 1,
            ..Default::default()
        };
        assert_eq!(spans(&build(&series, &cc, &config).unwrap()), vec![(1, 1)]);
    }

    #[test]
    fn min_run_rows_drops_short_runs() {
        let config = SegmentConfig {
            min_run_rows: 3,
            ..Default::default()
        };
        let cc = build(
            &scenario(),
            &Condition::ConstantCurrent { current: None },
            &config,
        )
        .unwrap();
        assert!(cc.is_empty());

        let cv = build(
            &cccv_charge(),
            &Condition::ConstantVoltage { voltage: None },
            &config,
        )
        .unwrap();
        assert_eq!(spans(&cv), vec![(5, 7)]);
    }

    #[test]
    fn cc_without_cv_neighbour_is_not_cccv() {
        let cccv = build_default(
            &scenario(),
            Condition::Cccv {
                current: None,
                voltage: None,
            },
        );
        assert!(cccv.is_empty());
    }

    #[test]
    fn pulses_are_isolated_short_cc_runs() {
        let series = series_of(&[
            (0.0, 0.0, 3.70, 1),
            (1.0, -1.67, 3.60, 2),
            (2.0, -1.67, 3.58, 2),
            (3.0, 0.0, 3.65, 3),
            (4.0, 1.67, 3.75, 4),
            (5.0, 1.67, 3.76, 4),
            (6.0, 0.0, 3.70, 5),
        ]);
        let all = build_default(&series, Condition::Pulse { current: None });
        assert_eq!(spans(&all), vec![(1, 2), (4, 5)]);

        let discharge = build_default(
            &series,
            Condition::Pulse {
                current: Some(-1.67),
            },
        );
        assert_eq!(spans(&discharge), vec![(1, 2)]);
    }

    #[test]
    fn long_cc_run_is_not_a_pulse() {
        let config = SegmentConfig {
            max_pulse_duration_s: 1.5,
            ..Default::default()
        };
        let series = series_of(&[
            (0.0, 0.0, 3.70, 1),
            (1.0, 1.0, 3.80, 2),
            (2.0, 1.0, 3.80, 2),
            (3.0, 1.0, 3.80, 2),
            (4.0, 0.0, 3.70, 3),
        ]);
        let pulses = build(&series, &Condition::Pulse { current: None }, &config).unwrap();
        assert!(pulses.is_empty());
    }

    #[test]
    fn cc_followed_by_cv_is_not_a_pulse() {
        let pulses = build_default(&cccv_charge(), Condition::Pulse { current: None });
        assert!(pulses.is_empty());
    }

    #[test]
    fn min_run_duration_drops_short_runs() {
        let config = SegmentConfig {
            min_run_duration_s: 10.0,
            ..Default::default()
        };
        let cc = build(
            &scenario(),
            &Condition::ConstantCurrent { current: None },
            &config,
        )
        .unwrap();
        assert!(cc.is_empty());
    }

    #[test]
    fn step_range_is_inclusive() {
        let series = series_of(&[
            (0.0, 0.0, 3.7, 9),
            (1.0, 0.0, 3.7, 10),
            (2.0, 1.0, 3.8, 10),
            (3.0, 1.0, 3.8, 11),
            (4.0, 0.0, 3.7, 12),
        ]);
        let condition = |a, b| Condition::Step {
            range: Some(Interval::new(a, b).unwrap()),
        };
        assert_eq!(spans(&build_default(&series, condition(10, 11))), vec![(1, 3)]);
        assert_eq!(spans(&build_default(&series, condition(10, 10))), vec![(1, 2)]);
        // Both bounds past the last step select the last step.
        assert_eq!(spans(&build_default(&series, condition(20, 30))), vec![(4, 4)]);
        assert_eq!(spans(&build_default(&series, condition(11, 99))), vec![(3, 4)]);
        assert!(build_default(&series, condition(1, 5)).is_empty());
    }

    #[test]
    fn unbounded_step_is_whole_series() {
        let all = build_default(&scenario(), Condition::Step { range: None });
        assert_eq!(spans(&all), vec![(0, 4)]);
    }

    #[test]
    fn repeated_steps_split_into_runs() {
        let series = series_of(&[
            (0.0, 0.0, 3.7, 1),
            (1.0, 1.0, 3.8, 2),
            (2.0, 0.0, 3.7, 1),
            (3.0, 1.0, 3.8, 2),
        ]);
        let steps = build_default(
            &series,
            Condition::Step {
                range: Some(Interval::new(2, 2).unwrap()),
            },
        );
        assert_eq!(spans(&steps), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn time_range_and_clamping() {
        let series = scenario();
        let condition = |a, b| Condition::Time {
            range: Some(Interval::new(a, b).unwrap()),
        };
        assert_eq!(spans(&build_default(&series, condition(1.0, 3.0))), vec![(1, 3)]);
        assert_eq!(spans(&build_default(&series, condition(2.0, 2.0))), vec![(2, 3)]);
        assert_eq!(spans(&build_default(&series, condition(50.0, 60.0))), vec![(4, 4)]);
        assert_eq!(spans(&build_default(&series, condition(3.0, 60.0))), vec![(3, 4)]);
    }

    #[test]
    fn segments_never_overlap() {
        for series in [cccv_charge(), dense_cccv_charge()] {
            for condition in [
                Condition::Rest,
                Condition::Charge { current: None },
                Condition::ConstantCurrent { current: None },
                Condition::ConstantVoltage { voltage: None },
                Condition::ConstantPower { power: None },
            ] {
                let collection = build_default(&series, condition);
                assert!(
                    collection
                        .as_slice()
                        .windows(2)
                        .all(|w| w[0].end < w[1].start),
                    "overlap for {condition}"
                );
            }
        }
    }
}
