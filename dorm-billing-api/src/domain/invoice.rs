use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::meter::{ensure_valid_reading, usage_units, MeterKind};
use crate::domain::money::ensure_non_negative;
use crate::domain::period::BillingPeriod;
use crate::domain::room::RoomNumber;
use crate::error::{BillingError, BillingResult};
use crate::service::calculator::ChargeBreakdown;

/// Namespace for deterministic invoice ids derived from `(room_id, period)`.
const INVOICE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d2f_6b1e_8a0c_4c55_9e43_1f7d_b2a4_c980);

/// One room's bill for one billing period.
///
/// Fields are private: an invoice is produced by the
/// [`InvoiceEngine`](crate::service::InvoiceEngine), rehydrated with
/// [`Invoice::restore`], and changed only through the engine. The baseline
/// readings never change after creation and a paid invoice never changes at
/// all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    id: Uuid,
    room_id: Uuid,
    room_number: RoomNumber,
    period: BillingPeriod,
    rent_price: Decimal,
    prev_water: i64,
    curr_water: i64,
    prev_elec: i64,
    curr_elec: i64,
    water_units: i64,
    elec_units: i64,
    water_charge: Decimal,
    elec_charge: Decimal,
    total: Decimal,
    is_paid: bool,
    due_date: NaiveDate,
}

/// Plain field bag used to move an invoice across the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceParts {
    pub id: Uuid,
    pub room_id: Uuid,
    pub room_number: RoomNumber,
    pub period: BillingPeriod,
    pub rent_price: Decimal,
    pub prev_water: i64,
    pub curr_water: i64,
    pub prev_elec: i64,
    pub curr_elec: i64,
    pub water_units: i64,
    pub elec_units: i64,
    pub water_charge: Decimal,
    pub elec_charge: Decimal,
    pub total: Decimal,
    pub is_paid: bool,
    pub due_date: NaiveDate,
}

impl Invoice {
    /// Deterministic identity of the invoice for `room_id` in `period`.
    pub fn id_for(room_id: Uuid, period: BillingPeriod) -> Uuid {
        Uuid::new_v5(&INVOICE_ID_NAMESPACE, format!("{room_id}:{period}").as_bytes())
    }

    /// Fresh invoice with current readings equal to the baseline.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        room_id: Uuid,
        room_number: RoomNumber,
        period: BillingPeriod,
        rent_price: Decimal,
        baseline_water: i64,
        baseline_elec: i64,
        charges: ChargeBreakdown,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Self::id_for(room_id, period),
            room_id,
            room_number,
            period,
            rent_price,
            prev_water: baseline_water,
            curr_water: baseline_water,
            prev_elec: baseline_elec,
            curr_elec: baseline_elec,
            water_units: 0,
            elec_units: 0,
            water_charge: charges.water_charge,
            elec_charge: charges.elec_charge,
            total: charges.total,
            is_paid: false,
            due_date,
        }
    }

    /// Copy of this invoice with new current readings and the derived fields
    /// recomputed from them. Callers check the paid flag first.
    pub(crate) fn with_readings(
        &self,
        curr_water: i64,
        curr_elec: i64,
        water_units: i64,
        elec_units: i64,
        charges: ChargeBreakdown,
    ) -> Self {
        Self {
            curr_water,
            curr_elec,
            water_units,
            elec_units,
            water_charge: charges.water_charge,
            elec_charge: charges.elec_charge,
            total: charges.total,
            ..self.clone()
        }
    }

    pub(crate) fn settled(&self) -> Self {
        Self {
            is_paid: true,
            ..self.clone()
        }
    }

    /// Rehydrates a stored invoice, rejecting rows that break the invoice
    /// invariants.
    pub fn restore(parts: InvoiceParts) -> BillingResult<Self> {
        if parts.id != Self::id_for(parts.room_id, parts.period) {
            return Err(BillingError::validation(format!(
                "invoice {} does not match room {} and period {}",
                parts.id, parts.room_id, parts.period
            )));
        }
        ensure_valid_reading(MeterKind::Water, parts.prev_water)?;
        ensure_valid_reading(MeterKind::Water, parts.curr_water)?;
        ensure_valid_reading(MeterKind::Electric, parts.prev_elec)?;
        ensure_valid_reading(MeterKind::Electric, parts.curr_elec)?;
        if parts.water_units != usage_units(parts.prev_water, parts.curr_water) {
            return Err(BillingError::validation(format!(
                "invoice {} water units {} disagree with readings {} -> {}",
                parts.id, parts.water_units, parts.prev_water, parts.curr_water
            )));
        }
        if parts.elec_units != usage_units(parts.prev_elec, parts.curr_elec) {
            return Err(BillingError::validation(format!(
                "invoice {} electric units {} disagree with readings {} -> {}",
                parts.id, parts.elec_units, parts.prev_elec, parts.curr_elec
            )));
        }
        ensure_non_negative("rent_price", parts.rent_price)?;
        ensure_non_negative("water_charge", parts.water_charge)?;
        ensure_non_negative("elec_charge", parts.elec_charge)?;
        ensure_non_negative("total", parts.total)?;

        Ok(Self {
            id: parts.id,
            room_id: parts.room_id,
            room_number: parts.room_number,
            period: parts.period,
            rent_price: parts.rent_price,
            prev_water: parts.prev_water,
            curr_water: parts.curr_water,
            prev_elec: parts.prev_elec,
            curr_elec: parts.curr_elec,
            water_units: parts.water_units,
            elec_units: parts.elec_units,
            water_charge: parts.water_charge,
            elec_charge: parts.elec_charge,
            total: parts.total,
            is_paid: parts.is_paid,
            due_date: parts.due_date,
        })
    }

    pub fn into_parts(self) -> InvoiceParts {
        InvoiceParts {
            id: self.id,
            room_id: self.room_id,
            room_number: self.room_number,
            period: self.period,
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
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    pub fn room_number(&self) -> &str {
        self.room_number.as_str()
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn rent_price(&self) -> Decimal {
        self.rent_price
    }

    pub fn prev_water(&self) -> i64 {
        self.prev_water
    }

    pub fn curr_water(&self) -> i64 {
        self.curr_water
    }

    pub fn prev_elec(&self) -> i64 {
        self.prev_elec
    }

    pub fn curr_elec(&self) -> i64 {
        self.curr_elec
    }

    pub fn previous_reading(&self, kind: MeterKind) -> i64 {
        match kind {
            MeterKind::Water => self.prev_water,
            MeterKind::Electric => self.prev_elec,
        }
    }

    pub fn current_reading(&self, kind: MeterKind) -> i64 {
        match kind {
            MeterKind::Water => self.curr_water,
            MeterKind::Electric => self.curr_elec,
        }
    }

    pub fn water_units(&self) -> i64 {
        self.water_units
    }

    pub fn elec_units(&self) -> i64 {
        self.elec_units
    }

    pub fn water_charge(&self) -> Decimal {
        self.water_charge
    }

    pub fn elec_charge(&self) -> Decimal {
        self.elec_charge
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

impl From<Invoice> for InvoiceParts {
    fn from(invoice: Invoice) -> Self {
        invoice.into_parts()
    }
}

impl TryFrom<InvoiceParts> for Invoice {
    type Error = BillingError;

    fn try_from(parts: InvoiceParts) -> Result<Self, Self::Error> {
        Invoice::restore(parts)
    }
}
