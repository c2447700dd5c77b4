use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::period::BillingPeriod;
use crate::error::{BillingError, BillingResult};

pub const DEFAULT_DUE_DAY: u32 = 5;

/// Highest due day that exists in every month.
pub const MAX_DUE_DAY: u32 = 28;

/// Due date rule: invoices for period (M, Y) fall due on a fixed day of the
/// month after M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub struct DueDatePolicy {
    day_of_following_month: u32,
}

impl DueDatePolicy {
    pub fn new(day_of_following_month: u32) -> BillingResult<Self> {
        if !(1..=MAX_DUE_DAY).contains(&day_of_following_month) {
            return Err(BillingError::validation(format!(
                "due day must be between 1 and {MAX_DUE_DAY}, got {day_of_following_month}"
            )));
        }
        Ok(Self {
            day_of_following_month,
        })
    }

    pub fn day_of_following_month(&self) -> u32 {
        self.day_of_following_month
    }

    /// The due date may fall outside the billable years, so the following
    /// month is computed on the calendar rather than as a `BillingPeriod`.
    pub fn due_date_for(&self, period: BillingPeriod) -> BillingResult<NaiveDate> {
        let (year, month) = match period.month() {
            12 => (period.year() + 1, 1),
            month => (period.year(), month + 1),
        };
        NaiveDate::from_ymd_opt(year, month, self.day_of_following_month).ok_or_else(|| {
            BillingError::validation(format!(
                "no due day {} in the month after {period}",
                self.day_of_following_month
            ))
        })
    }
}

impl From<DueDatePolicy> for u32 {
    fn from(policy: DueDatePolicy) -> Self {
        policy.day_of_following_month
    }
}

impl TryFrom<u32> for DueDatePolicy {
    type Error = BillingError;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        DueDatePolicy::new(day)
    }
}

impl Default for DueDatePolicy {
    fn default() -> Self {
        Self {
            day_of_following_month: DEFAULT_DUE_DAY,
        }
    }
}
