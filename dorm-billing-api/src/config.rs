use serde::{Deserialize, Serialize};

use crate::error::BillingResult;
use crate::service::due_date::DueDatePolicy;

/// Engine configuration. Rates are not part of it: they are data supplied on
/// every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub due_date_policy: DueDatePolicy,
}

impl EngineConfig {
    pub fn new(due_day_of_following_month: u32) -> BillingResult<Self> {
        Ok(Self {
            due_date_policy: DueDatePolicy::new(due_day_of_following_month)?,
        })
    }
}
