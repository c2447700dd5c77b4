use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::money::validate_non_negative_decimal;
use crate::error::BillingResult;

/// Utility rates and the flat monthly fee charged to every billed room.
///
/// Read on every calculation; the value passed in is the one in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RateConfig {
    #[validate(custom(function = "validate_non_negative_decimal"))]
    pub water_rate_per_unit: Decimal,

    #[validate(custom(function = "validate_non_negative_decimal"))]
    pub elec_rate_per_unit: Decimal,

    #[validate(custom(function = "validate_non_negative_decimal"))]
    pub common_fee: Decimal,
}

impl RateConfig {
    pub fn new(
        water_rate_per_unit: Decimal,
        elec_rate_per_unit: Decimal,
        common_fee: Decimal,
    ) -> BillingResult<Self> {
        let rates = Self {
            water_rate_per_unit,
            elec_rate_per_unit,
            common_fee,
        };
        rates.validate()?;
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BillingError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_accepts_zero_rates() {
        let rates = RateConfig::new(dec!(0), dec!(0), dec!(0)).unwrap();
        assert_eq!(rates.common_fee, dec!(0));
    }

    #[test]
    fn test_new_rejects_negative_rate() {
        let err = RateConfig::new(dec!(18), dec!(-7), dec!(300)).unwrap_err();
        match err {
            BillingError::ValidationError(message) => {
                assert!(message.contains("elec_rate_per_unit"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_deserialized_rates_are_revalidated() {
        let rates: RateConfig = serde_json::from_str(
            r#"{"water_rate_per_unit":"18","elec_rate_per_unit":"7","common_fee":"-1"}"#,
        )
        .unwrap();
        assert!(rates.validate().is_err());
    }
}
