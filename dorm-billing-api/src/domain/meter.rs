use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

/// Which meter a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeterKind {
    Water,
    Electric,
}

impl MeterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterKind::Water => "WATER",
            MeterKind::Electric => "ELECTRIC",
        }
    }
}

impl fmt::Display for MeterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeterKind {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WATER" => Ok(MeterKind::Water),
            "ELECTRIC" | "ELEC" | "ELECTRICITY" => Ok(MeterKind::Electric),
            _ => Err(BillingError::validation(format!("unknown meter kind '{s}'"))),
        }
    }
}

pub fn ensure_valid_reading(kind: MeterKind, reading: i64) -> BillingResult<i64> {
    if reading < 0 {
        return Err(BillingError::validation(format!(
            "{kind} meter reading must be non-negative, got {reading}"
        )));
    }
    Ok(reading)
}

/// Parses a raw meter reading as typed by an administrator or returned by
/// image recognition. Only whole, non-negative numbers are accepted.
pub fn parse_meter_reading(kind: MeterKind, raw: &str) -> BillingResult<i64> {
    let trimmed = raw.trim();
    let reading: i64 = trimmed.parse().map_err(|_| {
        BillingError::validation(format!("{kind} meter reading '{trimmed}' is not a whole number"))
    })?;
    ensure_valid_reading(kind, reading)
}

/// Units consumed between two readings. A reading below the baseline (meter
/// replacement or reset) yields zero usage.
pub fn usage_units(previous: i64, current: i64) -> i64 {
    current.saturating_sub(previous).max(0)
}
