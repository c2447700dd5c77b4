use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid state: {0}")]
    InvalidStateError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::ValidationError(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        BillingError::InvalidStateError(message.into())
    }

    /// True for errors caused by the caller's input or the invoice state,
    /// which must be shown to the administrator and never retried.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BillingError::ValidationError(_) | BillingError::InvalidStateError(_)
        )
    }
}

impl From<ValidationErrors> for BillingError {
    fn from(errors: ValidationErrors) -> Self {
        BillingError::ValidationError(errors.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = BillingError::invalid_state("invoice is paid");
        assert_eq!(err.to_string(), "Invalid state: invoice is paid");

        let err = BillingError::validation("reading must be non-negative");
        assert_eq!(err.to_string(), "Validation error: reading must be non-negative");
    }

    #[test]
    fn test_user_facing_kinds() {
        assert!(BillingError::validation("x").is_user_facing());
        assert!(BillingError::invalid_state("x").is_user_facing());
        assert!(!BillingError::DatabaseError("x".to_string()).is_user_facing());
        assert!(!BillingError::ConcurrentModification("x".to_string()).is_user_facing());
    }
}
