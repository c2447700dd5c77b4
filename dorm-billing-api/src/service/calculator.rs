use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::money::{ensure_non_negative, round_money};
use crate::domain::rate_config::RateConfig;
use crate::error::{BillingError, BillingResult};

/// Itemised charges for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    pub water_charge: Decimal,
    pub elec_charge: Decimal,
    pub total: Decimal,
}

fn unit_charge(label: &str, units: i64, rate: Decimal) -> BillingResult<Decimal> {
    if units < 0 {
        return Err(BillingError::validation(format!(
            "{label} units must be non-negative, got {units}"
        )));
    }
    Decimal::from(units)
        .checked_mul(rate)
        .map(round_money)
        .ok_or_else(|| BillingError::validation(format!("{label} charge overflows: {units} x {rate}")))
}

/// Invoice total:
/// `rent + round(water_units * water_rate) + round(elec_units * elec_rate) + common_fee`.
///
/// The only place the formula is written down. Every amount comes back with
/// two decimal places.
pub fn compute_total(
    rent_price: Decimal,
    water_units: i64,
    elec_units: i64,
    rates: &RateConfig,
) -> BillingResult<Decimal> {
    rates.validate()?;
    ensure_non_negative("rent_price", rent_price)?;
    let water_charge = unit_charge("water", water_units, rates.water_rate_per_unit)?;
    let elec_charge = unit_charge("electric", elec_units, rates.elec_rate_per_unit)?;

    [water_charge, elec_charge, rates.common_fee]
        .into_iter()
        .try_fold(rent_price, |acc, part| acc.checked_add(part))
        .map(round_money)
        .ok_or_else(|| BillingError::validation("invoice total overflows"))
}

/// Itemised form of [`compute_total`].
pub fn compute_charges(
    rent_price: Decimal,
    water_units: i64,
    elec_units: i64,
    rates: &RateConfig,
) -> BillingResult<ChargeBreakdown> {
    let total = compute_total(rent_price, water_units, elec_units, rates)?;
    Ok(ChargeBreakdown {
        water_charge: unit_charge("water", water_units, rates.water_rate_per_unit)?,
        elec_charge: unit_charge("electric", elec_units, rates.elec_rate_per_unit)?,
        total,
    })
}
