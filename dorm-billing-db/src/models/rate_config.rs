use chrono::{DateTime, Utc};
use dorm_billing_api::{BillingError, RateConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;
use crate::utils::hash_as_i64;

/// Rate configuration row. The table holds a single row with
/// [`RateConfigModel::CURRENT_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RateConfigModel {
    pub id: Uuid,
    pub water_rate_per_unit: Decimal,
    pub elec_rate_per_unit: Decimal,
    pub common_fee: Decimal,
    pub updated_at: DateTime<Utc>,
    pub hash: i64,
}

impl RateConfigModel {
    pub const CURRENT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

    pub fn from_rates(rates: &RateConfig, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::CURRENT_ID,
            water_rate_per_unit: rates.water_rate_per_unit,
            elec_rate_per_unit: rates.elec_rate_per_unit,
            common_fee: rates.common_fee,
            updated_at,
            hash: 0,
        }
    }

    pub fn to_rates(&self) -> Result<RateConfig, BillingError> {
        RateConfig::new(self.water_rate_per_unit, self.elec_rate_per_unit, self.common_fee)
    }

    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }
}

impl Identifiable for RateConfigModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rates_round_trip() {
        let rates = RateConfig::new(dec!(18), dec!(7), dec!(300)).unwrap();
        let model = RateConfigModel::from_rates(&rates, Utc::now());
        assert_eq!(model.id, RateConfigModel::CURRENT_ID);
        assert_eq!(model.to_rates().unwrap(), rates);
    }

    #[test]
    fn test_stored_negative_rate_is_rejected() {
        let rates = RateConfig::new(dec!(18), dec!(7), dec!(300)).unwrap();
        let mut model = RateConfigModel::from_rates(&rates, Utc::now());
        model.common_fee = dec!(-1);
        assert!(model.to_rates().is_err());
    }
}
