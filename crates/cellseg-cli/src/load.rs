//! Canonical CSV loading.
//!
//! Columns are found by header name. Vendor-specific exports must be converted
//! to these headers first.

use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use cellseg_core::{Record, Series};
use csv::StringRecord;
use tracing::debug;

const TIME: &[&str] = &["time", "time [s]"];
const CURRENT: &[&str] = &["current", "current [a]"];
const VOLTAGE: &[&str] = &["voltage", "voltage [v]"];
const POWER: &[&str] = &["power", "power [w]"];
const STEP: &[&str] = &["step", "step number"];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    time: usize,
    current: usize,
    voltage: usize,
    power: Option<usize>,
    step: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.contains(&h.trim().to_lowercase().as_str()))
        };
        let require = |aliases: &[&str]| {
            find(aliases).with_context(|| format!("missing required column {:?}", aliases[0]))
        };
        Ok(Self {
            time: require(TIME)?,
            current: require(CURRENT)?,
            voltage: require(VOLTAGE)?,
            power: find(POWER),
            step: find(STEP),
        })
    }
}

/// Loads a series from a CSV file.
pub fn load_series(path: &Path) -> Result<Series> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let series =
        read_series(file).with_context(|| format!("failed to load {}", path.display()))?;
    debug!(path = %path.display(), rows = series.len(), "loaded series");
    Ok(series)
}

/// Reads a series from CSV text with a header row.
pub fn read_series<R: io::Read>(reader: R) -> Result<Series> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers().context("failed to read header row")?)?;

    let mut records: Vec<Record> = Vec::new();
    for row in reader.records() {
        let row = row.context("failed to read CSV row")?;
        let line = row.position().map_or(0, csv::Position::line);
        let record = parse_row(&row, columns).with_context(|| format!("line {line}"))?;
        if let Some(previous) = records.last().filter(|p| record.time < p.time) {
            bail!(
                "line {line}: time {} is earlier than the previous row ({})",
                record.time,
                previous.time
            );
        }
        records.push(record);
    }
    Ok(Series::new(records))
}

fn parse_row(row: &StringRecord, columns: Columns) -> Result<Record> {
    let time = number(row, columns.time, "time")?;
    let current = number(row, columns.current, "current")?;
    let voltage = number(row, columns.voltage, "voltage")?;
    let step = match columns.step {
        Some(index) => {
            let raw = cell(row, index, "step")?;
            raw.parse::<i64>()
                .with_context(|| format!("invalid step {raw:?}"))?
        }
        None => 0,
    };
    let mut record = Record::new(time, current, voltage, step);
    if let Some(index) = columns.power {
        record.power = number(row, index, "power")?;
    }
    Ok(record)
}

fn cell<'r>(row: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    row.get(index)
        .with_context(|| format!("missing {name} value"))
}

fn number(row: &StringRecord, index: usize, name: &str) -> Result<f64> {
    let raw = cell(row, index, name)?;
    let value = raw
        .parse::<f64>()
        .with_context(|| format!("invalid {name} {raw:?}"))?;
    if !value.is_finite() {
        bail!("invalid {name} {raw:?}: not a finite number");
    }
    Ok(value)
}
