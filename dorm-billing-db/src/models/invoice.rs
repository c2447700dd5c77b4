use chrono::NaiveDate;
use dorm_billing_api::{round_money, BillingError, BillingPeriod, Invoice, InvoiceParts, RoomNumber};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Identifiable;
use crate::utils::hash_as_i64;

/// # Documentation
/// - Row of the `invoice` table, one per room and billing period.
/// - `(room_id, period_year, period_month)` is unique in storage.
/// - `hash` covers every other column and guards updates against stale writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceModel {
    pub id: Uuid,
    pub room_id: Uuid,
    pub room_number: RoomNumber,
    pub period_year: i32,
    pub period_month: i32,

    pub prev_water: i64,
    pub curr_water: i64,
    pub prev_elec: i64,
    pub curr_elec: i64,
    pub water_units: i64,
    pub elec_units: i64,

    pub rent_price: Decimal,
    pub water_charge: Decimal,
    pub elec_charge: Decimal,
    pub total: Decimal,

    pub is_paid: bool,
    pub due_date: NaiveDate,

    pub hash: i64,
}

impl InvoiceModel {
    /// Row for a newly generated invoice. The hash is left at 0 and computed
    /// by the repository on insert.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let parts = invoice.clone().into_parts();
        Self {
            id: parts.id,
            room_id: parts.room_id,
            room_number: parts.room_number,
            period_year: parts.period.year(),
            period_month: parts.period.month() as i32,
            prev_water: parts.prev_water,
            curr_water: parts.curr_water,
            prev_elec: parts.prev_elec,
            curr_elec: parts.curr_elec,
            water_units: parts.water_units,
            elec_units: parts.elec_units,
            rent_price: round_money(parts.rent_price),
            water_charge: round_money(parts.water_charge),
            elec_charge: round_money(parts.elec_charge),
            total: round_money(parts.total),
            is_paid: parts.is_paid,
            due_date: parts.due_date,
            hash: 0,
        }
    }

    /// Row carrying `invoice`'s new state while keeping this row's stored
    /// hash, which the update compares against.
    pub fn updated_from(&self, invoice: &Invoice) -> Self {
        Self {
            hash: self.hash,
            ..Self::from_invoice(invoice)
        }
    }

    pub fn period(&self) -> Result<BillingPeriod, BillingError> {
        let month = u32::try_from(self.period_month)
            .map_err(|_| BillingError::validation(format!("invalid period month {}", self.period_month)))?;
        BillingPeriod::new(month, self.period_year)
    }

    /// Hash of the row content with `hash` itself zeroed.
    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }

    pub fn into_invoice(self) -> Result<Invoice, BillingError> {
        let period = self.period()?;
        Invoice::restore(InvoiceParts {
            id: self.id,
            room_id: self.room_id,
            room_number: self.room_number,
            period,
            rent_price: self.rent_price,
            prev_water: self.prev_water,
            curr_water: self.curr_water,
            prev_elec: self.prev_elec,
            curr_elec: self.curr_elec,
            water_units: self.water_units,
            elec_units: self.elec_units,
            water_charge: self.water_charge,
            elec_charge: self.elec_charge,
            total: self.total,
            is_paid: self.is_paid,
            due_date: self.due_date,
        })
    }
}

impl Identifiable for InvoiceModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl TryFrom<InvoiceModel> for Invoice {
    type Error = BillingError;

    fn try_from(model: InvoiceModel) -> Result<Self, Self::Error> {
        model.into_invoice()
    }
}
