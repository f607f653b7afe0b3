//! Request-string parsing.
//!
//! A request is one or more comma-separated conditions, each a regime keyword
//! followed by an optional range or target:
//!
//! ```text
//! step 10:20        time 50/200       rest
//! charging 0.5A     dischg 500mA      cc 1.67A
//! cv 4.2V           power 1.05W       cccv 1.67A 4.2V
//! pulse -1.67A      cv, rest
//! ```

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::condition::{Condition, Interval};
use crate::error::SegmentError;
use crate::regime::{Regime, UnknownRegime};

/// Separates the stages of a chained request.
pub const CHAIN_DELIMITER: char = ',';

static STEP_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?\d+):([+-]?\d+)$").unwrap());

static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+))/([+-]?(?:\d+\.?\d*|\.\d+))$").unwrap()
});

static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)(m?)([AVW])$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Amp,
    Volt,
    Watt,
}

impl Unit {
    const fn symbol(self) -> char {
        match self {
            Self::Amp => 'A',
            Self::Volt => 'V',
            Self::Watt => 'W',
        }
    }
}

/// Parses a request into its ordered chain of conditions.
///
/// Every error carries the full request string.
pub fn parse(request: &str) -> Result<Vec<Condition>, SegmentError> {
    if request.trim().is_empty() {
        return Err(SegmentError::malformed(request, "empty request"));
    }
    request
        .split(CHAIN_DELIMITER)
        .map(|atom| parse_atom(request, atom.trim()))
        .collect()
}

impl FromStr for Condition {
    type Err = SegmentError;

    /// Parses a single, unchained condition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse(s)?.as_slice() {
            [condition] => Ok(*condition),
            _ => Err(SegmentError::malformed(s, "expected a single condition")),
        }
    }
}

fn parse_atom(request: &str, atom: &str) -> Result<Condition, SegmentError> {
    let mut tokens = atom.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err(SegmentError::malformed(request, "empty condition in chain"));
    };
    let regime: Regime = keyword
        .parse()
        .map_err(|e: UnknownRegime| SegmentError::malformed(request, e.to_string()))?;
    let args: Vec<&str> = tokens.collect();

    let condition = match regime {
        Regime::Step => Condition::Step {
            range: optional_arg(request, regime, &args)?
                .map(|arg| parse_step_range(request, arg))
                .transpose()?,
        },
        Regime::Time => Condition::Time {
            range: optional_arg(request, regime, &args)?
                .map(|arg| parse_time_range(request, arg))
                .transpose()?,
        },
        Regime::Rest => {
            if let Some(arg) = optional_arg(request, regime, &args)? {
                return Err(SegmentError::malformed(
                    request,
                    format!("rest takes no argument, got {arg:?}"),
                ));
            }
            Condition::Rest
        }
        Regime::Charge => Condition::Charge {
            current: single_target(request, regime, &args, Unit::Amp)?,
        },
        Regime::Discharge => Condition::Discharge {
            current: single_target(request, regime, &args, Unit::Amp)?,
        },
        Regime::ConstantCurrent => Condition::ConstantCurrent {
            current: single_target(request, regime, &args, Unit::Amp)?,
        },
        Regime::ConstantVoltage => Condition::ConstantVoltage {
            voltage: single_target(request, regime, &args, Unit::Volt)?,
        },
        Regime::ConstantPower => Condition::ConstantPower {
            power: single_target(request, regime, &args, Unit::Watt)?,
        },
        Regime::Pulse => Condition::Pulse {
            current: single_target(request, regime, &args, Unit::Amp)?,
        },
        Regime::Cccv => parse_cccv(request, &args)?,
    };
    Ok(condition)
}

fn optional_arg<'a>(
    request: &str,
    regime: Regime,
    args: &[&'a str],
) -> Result<Option<&'a str>, SegmentError> {
    match args {
        [] => Ok(None),
        [arg] => Ok(Some(*arg)),
        _ => Err(SegmentError::malformed(
            request,
            format!("{regime} takes at most one argument, got {}", args.len()),
        )),
    }
}

fn single_target(
    request: &str,
    regime: Regime,
    args: &[&str],
    unit: Unit,
) -> Result<Option<f64>, SegmentError> {
    let Some(arg) = optional_arg(request, regime, args)? else {
        return Ok(None);
    };
    let (value, found) = parse_target(request, arg)?;
    if found != unit {
        return Err(SegmentError::malformed(
            request,
            format!(
                "{regime} target must be in {}, got {arg:?}",
                unit.symbol()
            ),
        ));
    }
    Ok(Some(value))
}

fn parse_cccv(request: &str, args: &[&str]) -> Result<Condition, SegmentError> {
    if args.len() > 2 {
        return Err(SegmentError::malformed(
            request,
            format!("cccv takes at most two targets, got {}", args.len()),
        ));
    }

    let mut current = None;
    let mut voltage = None;
    for arg in args {
        let (target, value, name) = match parse_target(request, arg)? {
            (value, Unit::Amp) => (&mut current, value, "current"),
            (value, Unit::Volt) => (&mut voltage, value, "voltage"),
            (_, Unit::Watt) => {
                return Err(SegmentError::malformed(
                    request,
                    format!("cccv accepts A and V targets, got {arg:?}"),
                ));
            }
        };
        if target.replace(value).is_some() {
            return Err(SegmentError::unsupported(
                request,
                format!("cccv accepts one {name} target"),
            ));
        }
    }
    Ok(Condition::Cccv { current, voltage })
}

/// Parses `1.67A`, `-500mA`, `4.2V`, `1.05W` into a base-unit value.
fn parse_target(request: &str, arg: &str) -> Result<(f64, Unit), SegmentError> {
    let Some(caps) = TARGET_RE.captures(arg) else {
        let reason = if arg.parse::<f64>().is_ok() {
            format!("target {arg:?} is missing a unit suffix (A, V or W)")
        } else {
            format!("invalid target {arg:?}")
        };
        return Err(SegmentError::malformed(request, reason));
    };

    let mut value: f64 = caps[1]
        .parse()
        .map_err(|_| SegmentError::malformed(request, format!("invalid number in {arg:?}")))?;
    if &caps[2] == "m" {
        value /= 1000.0;
    }
    let unit = match &caps[3] {
        "A" => Unit::Amp,
        "V" => Unit::Volt,
        _ => Unit::Watt,
    };
    Ok((value, unit))
}

fn parse_step_range(request: &str, arg: &str) -> Result<Interval<i64>, SegmentError> {
    let caps = STEP_RANGE_RE.captures(arg).ok_or_else(|| {
        SegmentError::malformed(request, format!("expected step range a:b, got {arg:?}"))
    })?;
    let bound = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| SegmentError::malformed(request, format!("step index {s:?} out of range")))
    };
    let (first, last) = (bound(&caps[1])?, bound(&caps[2])?);
    Interval::new(first, last).map_err(|_| {
        SegmentError::malformed(request, format!("step range {first}:{last} is inverted"))
    })
}

fn parse_time_range(request: &str, arg: &str) -> Result<Interval<f64>, SegmentError> {
    let caps = TIME_RANGE_RE.captures(arg).ok_or_else(|| {
        SegmentError::malformed(request, format!("expected time range a/b, got {arg:?}"))
    })?;
    let bound = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| SegmentError::malformed(request, format!("invalid time {s:?}")))
    };
    let (first, last) = (bound(&caps[1])?, bound(&caps[2])?);
    Interval::new(first, last).map_err(|_| {
        SegmentError::malformed(request, format!("time range {first}/{last} is inverted"))
    })
}
