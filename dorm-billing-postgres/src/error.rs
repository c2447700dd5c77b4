use dorm_billing_api::BillingError;
use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

/// Raised by `update_batch` when the stored row no longer carries the hash
/// the caller loaded, or was closed in the meantime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Concurrent update detected for {entity} id: {id}")]
pub struct StaleWriteError {
    pub entity: &'static str,
    pub id: Uuid,
}

/// Maps a repository error onto the billing error taxonomy.
pub fn to_billing_error(err: Box<dyn Error + Send + Sync>) -> BillingError {
    if let Some(stale) = err.downcast_ref::<StaleWriteError>() {
        return BillingError::ConcurrentModification(stale.to_string());
    }
    match err.downcast::<BillingError>() {
        Ok(billing) => *billing,
        Err(other) => BillingError::DatabaseError(other.to_string()),
    }
}
