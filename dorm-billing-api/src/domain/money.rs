use rust_decimal::{Decimal, RoundingStrategy};
use validator::ValidationError;

use crate::error::{BillingError, BillingResult};

/// Number of decimal places kept on every computed amount (satang).
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary amount to [`MONEY_SCALE`] places, half away from zero,
/// and fixes the scale so equal amounts also serialize identically.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

pub fn ensure_non_negative(field: &str, value: Decimal) -> BillingResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(BillingError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(value)
}

/// Field validator used by `#[validate(custom(...))]` on decimal fields.
pub(crate) fn validate_non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some(format!("must be non-negative, got {value}").into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(2.5)).to_string(), "2.50");
        assert_eq!(round_money(dec!(4620)).to_string(), "4620.00");
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("rent", dec!(0)).is_ok());
        assert!(ensure_non_negative("rent", dec!(-0.00)).is_ok());
        assert!(matches!(
            ensure_non_negative("rent", dec!(-1)),
            Err(BillingError::ValidationError(_))
        ));
    }
}
