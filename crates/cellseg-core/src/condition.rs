//! Structured segmentation conditions.
//!
//! A [`Condition`] is produced once by the query parser (or built directly) and
//! pattern-matched by the builder. Targets are stored in base SI units.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;
use crate::regime::Regime;

/// An inclusive `[first, last]` bound with `first <= last`.
///
/// Deserialization goes through [`Interval::new`], so inverted bounds are
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IntervalBounds<T>",
    bound(deserialize = "T: Deserialize<'de> + PartialOrd + Copy + fmt::Display")
)]
pub struct Interval<T> {
    first: T,
    last: T,
}

/// Unchecked wire form of [`Interval`].
#[derive(Deserialize)]
struct IntervalBounds<T> {
    first: T,
    last: T,
}

impl<T: PartialOrd + Copy + fmt::Display> TryFrom<IntervalBounds<T>> for Interval<T> {
    type Error = SegmentError;

    fn try_from(bounds: IntervalBounds<T>) -> Result<Self, Self::Error> {
        Self::new(bounds.first, bounds.last)
    }
}

impl<T: PartialOrd + Copy + fmt::Display> Interval<T> {
    /// Creates an interval, rejecting `first > last`.
    pub fn new(first: T, last: T) -> Result<Self, SegmentError> {
        if first > last {
            return Err(SegmentError::malformed(
                &format!("{first}..{last}"),
                format!("range start {first} is after end {last}"),
            ));
        }
        Ok(Self { first, last })
    }

    pub const fn first(&self) -> T {
        self.first
    }

    pub const fn last(&self) -> T {
        self.last
    }

    pub fn contains(&self, value: T) -> bool {
        self.first <= value && value <= self.last
    }
}

/// One stage of a segmentation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum Condition {
    /// Rows whose step index lies in the range; the whole series when `None`.
    Step { range: Option<Interval<i64>> },
    /// Rows whose time (seconds) lies in the range; the whole series when `None`.
    Time { range: Option<Interval<f64>> },
    Rest,
    /// Positive current, optionally near `|current|` amperes.
    Charge { current: Option<f64> },
    /// Negative current, optionally near `-|current|` amperes.
    Discharge { current: Option<f64> },
    ConstantCurrent { current: Option<f64> },
    ConstantVoltage { voltage: Option<f64> },
    ConstantPower { power: Option<f64> },
    /// A CC run followed directly by a CV run. Each target binds its own phase.
    Cccv {
        current: Option<f64>,
        voltage: Option<f64>,
    },
    /// A short CC run isolated by rest or step changes. The target's sign picks
    /// charge or discharge pulses.
    Pulse { current: Option<f64> },
}

impl Condition {
    #[must_use]
    pub const fn regime(&self) -> Regime {
        match self {
            Self::Step { .. } => Regime::Step,
            Self::Time { .. } => Regime::Time,
            Self::Rest => Regime::Rest,
            Self::Charge { .. } => Regime::Charge,
            Self::Discharge { .. } => Regime::Discharge,
            Self::ConstantCurrent { .. } => Regime::ConstantCurrent,
            Self::ConstantVoltage { .. } => Regime::ConstantVoltage,
            Self::ConstantPower { .. } => Regime::ConstantPower,
            Self::Cccv { .. } => Regime::Cccv,
            Self::Pulse { .. } => Regime::Pulse,
        }
    }

    /// The single-valued target of a simple electrical regime, if any.
    #[must_use]
    pub const fn target(&self) -> Option<f64> {
        match self {
            Self::Charge { current }
            | Self::Discharge { current }
            | Self::ConstantCurrent { current }
            | Self::Pulse { current } => *current,
            Self::ConstantVoltage { voltage } => *voltage,
            Self::ConstantPower { power } => *power,
            Self::Step { .. } | Self::Time { .. } | Self::Rest | Self::Cccv { .. } => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.regime())?;
        match self {
            Self::Step { range: Some(r) } => write!(f, " {}:{}", r.first(), r.last()),
            Self::Time { range: Some(r) } => write!(f, " {}/{}", r.first(), r.last()),
            Self::Charge { current: Some(a) }
            | Self::Discharge { current: Some(a) }
            | Self::ConstantCurrent { current: Some(a) }
            | Self::Pulse { current: Some(a) } => write!(f, " {a}A"),
            Self::ConstantVoltage { voltage: Some(v) } => write!(f, " {v}V"),
            Self::ConstantPower { power: Some(w) } => write!(f, " {w}W"),
            Self::Cccv { current, voltage } => {
                if let Some(a) = current {
                    write!(f, " {a}A")?;
                }
                if let Some(v) = voltage {
                    write!(f, " {v}V")?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
