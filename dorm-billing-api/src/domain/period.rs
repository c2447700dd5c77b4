use std::fmt;
use std::str::FromStr;

use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Thai month names as shown by the administrator's period selector.
const THAI_MONTH_NAMES: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Billing period: one calendar month of one year.
///
/// Ordered chronologically (year first, then month). Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BillingPeriod {
    // Field order drives the derived `Ord`.
    year: i32,
    month: u32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> BillingResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(BillingError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(BillingError::validation(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Builds a period from a Thai or English month name.
    pub fn from_month_name(name: &str, year: i32) -> BillingResult<Self> {
        let name = name.trim();
        if let Some(index) = THAI_MONTH_NAMES.iter().position(|thai| *thai == name) {
            return Self::new(index as u32 + 1, year);
        }
        let month = Month::from_str(name)
            .map_err(|_| BillingError::validation(format!("unknown month name '{name}'")))?;
        Self::new(month.number_from_month(), year)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn thai_month_name(&self) -> &'static str {
        THAI_MONTH_NAMES[(self.month - 1) as usize]
    }

    /// The period immediately after this one; December rolls into January.
    pub fn next(&self) -> BillingResult<Self> {
        if self.month == 12 {
            Self::new(1, self.year + 1)
        } else {
            Self::new(self.month + 1, self.year)
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BillingError::validation(format!("billing period must be YYYY-MM, got '{s}'"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(month, year)
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for BillingPeriod {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
