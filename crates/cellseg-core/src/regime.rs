//! Regime tags and the per-row classification predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Tolerance;
use crate::record::Record;

/// Electrical-behaviour regimes a segment can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Step,
    Time,
    Rest,
    Charge,
    Discharge,
    ConstantCurrent,
    ConstantVoltage,
    ConstantPower,
    Cccv,
    Pulse,
}

impl Regime {
    /// Canonical request keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Time => "time",
            Self::Rest => "rest",
            Self::Charge => "charging",
            Self::Discharge => "dischg",
            Self::ConstantCurrent => "cc",
            Self::ConstantVoltage => "cv",
            Self::ConstantPower => "power",
            Self::Cccv => "cccv",
            Self::Pulse => "pulse",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Regime {
    type Err = UnknownRegime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "step" => Ok(Self::Step),
            "time" => Ok(Self::Time),
            "rest" => Ok(Self::Rest),
            "charging" | "charge" | "chg" => Ok(Self::Charge),
            "dischg" | "discharging" | "discharge" => Ok(Self::Discharge),
            "cc" => Ok(Self::ConstantCurrent),
            "cv" => Ok(Self::ConstantVoltage),
            "power" | "cp" => Ok(Self::ConstantPower),
            "cccv" => Ok(Self::Cccv),
            "pulse" => Ok(Self::Pulse),
            _ => Err(UnknownRegime(s.to_string())),
        }
    }
}

impl Serialize for Regime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.keyword())
    }
}

impl<'de> Deserialize<'de> for Regime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unrecognized regime keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegime(String);

impl fmt::Display for UnknownRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown regime keyword: {}", self.0)
    }
}

impl std::error::Error for UnknownRegime {}

/// Direction of current flow for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Rest,
    Charge,
    Discharge,
}

impl Polarity {
    #[must_use]
    pub fn of(record: &Record, tolerance: &Tolerance) -> Self {
        if tolerance.is_rest(record.current) {
            Self::Rest
        } else if record.current > 0.0 {
            Self::Charge
        } else {
            Self::Discharge
        }
    }

    /// Polarity implied by the sign of a current target.
    #[must_use]
    pub fn of_target(current: f64) -> Self {
        if current < 0.0 {
            Self::Discharge
        } else {
            Self::Charge
        }
    }
}

/// The measured column a constant-value regime holds steady.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Current,
    Voltage,
    Power,
}

impl Quantity {
    #[must_use]
    pub const fn of(&self, record: &Record) -> f64 {
        match self {
            Self::Current => record.current,
            Self::Voltage => record.voltage,
            Self::Power => record.power,
        }
    }
}

/// Decides whether one row is compatible with `regime`.
///
/// For the constant regimes `reference` is the value the row must sit near:
/// either a requested target or the running mean of the open run. Composite and
/// index-range regimes cannot be judged from one row; `Cccv` and `Pulse` only
/// require current flow here and `Step`/`Time` accept every row.
#[must_use]
pub fn classify_row(
    record: &Record,
    regime: Regime,
    reference: Option<f64>,
    tolerance: &Tolerance,
) -> bool {
    let polarity = Polarity::of(record, tolerance);
    let near = |quantity: Quantity, reference: Option<f64>| {
        reference.is_none_or(|r| tolerance.matches(quantity.of(record), r))
    };

    match regime {
        Regime::Step | Regime::Time => true,
        Regime::Rest => polarity == Polarity::Rest,
        Regime::Charge => {
            polarity == Polarity::Charge && near(Quantity::Current, reference.map(f64::abs))
        }
        Regime::Discharge => {
            polarity == Polarity::Discharge
                && near(Quantity::Current, reference.map(|r| -r.abs()))
        }
        Regime::ConstantCurrent | Regime::Pulse => {
            polarity != Polarity::Rest && near(Quantity::Current, reference)
        }
        Regime::ConstantVoltage => {
            polarity != Polarity::Rest && near(Quantity::Voltage, reference)
        }
        Regime::ConstantPower => polarity != Polarity::Rest && near(Quantity::Power, reference),
        Regime::Cccv => polarity != Polarity::Rest,
    }
}
