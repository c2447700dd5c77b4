use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::EngineConfig;
use crate::domain::invoice::Invoice;
use crate::domain::meter::{ensure_valid_reading, usage_units, MeterKind};
use crate::domain::period::BillingPeriod;
use crate::domain::rate_config::RateConfig;
use crate::domain::room::RoomSnapshot;
use crate::error::{BillingError, BillingResult};
use crate::service::calculator::compute_charges;

/// Computes invoices from rooms, readings and rates.
///
/// The engine owns no state besides its configuration and performs no I/O:
/// every operation returns a new value and the caller persists it. It is safe
/// to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceEngine {
    config: EngineConfig,
}

impl InvoiceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opens one invoice per occupied room for `period`.
    ///
    /// Vacant rooms are skipped and a room listed twice is billed once. The
    /// caller passes only rooms that have no invoice for `period` yet; use
    /// [`InvoiceEngine::generate_missing_invoices`] to let the engine filter.
    ///
    /// # Errors
    /// * `ValidationError` - invalid rates or room data; nothing is generated
    pub fn generate_invoices(
        &self,
        period: BillingPeriod,
        rooms: &[RoomSnapshot],
        rates: &RateConfig,
    ) -> BillingResult<Vec<Invoice>> {
        self.generate_excluding(period, rooms, &HashSet::new(), rates)
    }

    /// Like [`InvoiceEngine::generate_invoices`], but skips rooms that already
    /// have an invoice for `period` in `existing`. Skipping is not an error.
    pub fn generate_missing_invoices(
        &self,
        period: BillingPeriod,
        rooms: &[RoomSnapshot],
        existing: &[Invoice],
        rates: &RateConfig,
    ) -> BillingResult<Vec<Invoice>> {
        let billed: HashSet<Uuid> = existing
            .iter()
            .filter(|invoice| invoice.period() == period)
            .map(|invoice| invoice.room_id())
            .collect();
        self.generate_excluding(period, rooms, &billed, rates)
    }

    fn generate_excluding(
        &self,
        period: BillingPeriod,
        rooms: &[RoomSnapshot],
        billed: &HashSet<Uuid>,
        rates: &RateConfig,
    ) -> BillingResult<Vec<Invoice>> {
        rates.validate()?;
        let due_date = self.config.due_date_policy.due_date_for(period)?;

        let mut seen = HashSet::new();
        let mut invoices = Vec::new();
        for room in rooms.iter().filter(|room| room.occupied) {
            if billed.contains(&room.room_id) {
                debug!(room_id = %room.room_id, %period, "room already invoiced for period, skipping");
                continue;
            }
            if !seen.insert(room.room_id) {
                debug!(room_id = %room.room_id, %period, "room listed twice, skipping duplicate");
                continue;
            }
            room.validate()?;

            let charges = compute_charges(room.rent_price, 0, 0, rates)?;
            invoices.push(Invoice::open(
                room.room_id,
                room.room_number.clone(),
                period,
                room.rent_price,
                room.last_meter_water,
                room.last_meter_elec,
                charges,
                due_date,
            ));
        }

        info!(%period, count = invoices.len(), "generated invoices");
        Ok(invoices)
    }

    /// Records a new current reading for one meter and recomputes every
    /// derived field.
    ///
    /// # Errors
    /// * `InvalidStateError` - the invoice is paid
    /// * `ValidationError` - the reading is negative or the rates are invalid
    pub fn apply_meter_reading(
        &self,
        invoice: &Invoice,
        kind: MeterKind,
        new_reading: i64,
        rates: &RateConfig,
    ) -> BillingResult<Invoice> {
        let (water, elec) = match kind {
            MeterKind::Water => (new_reading, invoice.curr_elec()),
            MeterKind::Electric => (invoice.curr_water(), new_reading),
        };
        self.apply_meter_readings(invoice, water, elec, rates)
    }

    /// Records both current readings at once. Either both are applied or the
    /// call fails and nothing changes.
    pub fn apply_meter_readings(
        &self,
        invoice: &Invoice,
        curr_water: i64,
        curr_elec: i64,
        rates: &RateConfig,
    ) -> BillingResult<Invoice> {
        if invoice.is_paid() {
            return Err(BillingError::invalid_state(format!(
                "invoice {} for room {} ({}) is paid; readings can no longer change",
                invoice.id(),
                invoice.room_number(),
                invoice.period()
            )));
        }
        ensure_valid_reading(MeterKind::Water, curr_water)?;
        ensure_valid_reading(MeterKind::Electric, curr_elec)?;

        for (kind, current) in [(MeterKind::Water, curr_water), (MeterKind::Electric, curr_elec)] {
            let previous = invoice.previous_reading(kind);
            if current < previous {
                warn!(
                    invoice_id = %invoice.id(),
                    meter = %kind,
                    previous,
                    current,
                    "reading below baseline, usage clamped to zero"
                );
            }
        }

        let water_units = usage_units(invoice.prev_water(), curr_water);
        let elec_units = usage_units(invoice.prev_elec(), curr_elec);
        let charges = compute_charges(invoice.rent_price(), water_units, elec_units, rates)?;

        Ok(invoice.with_readings(curr_water, curr_elec, water_units, elec_units, charges))
    }

    /// Marks the invoice paid. Marking a paid invoice again returns it
    /// unchanged.
    pub fn mark_paid(&self, invoice: &Invoice) -> Invoice {
        if invoice.is_paid() {
            debug!(invoice_id = %invoice.id(), "invoice already paid");
            return invoice.clone();
        }
        info!(invoice_id = %invoice.id(), room_number = invoice.room_number(), total = %invoice.total(), "invoice marked paid");
        invoice.settled()
    }

    /// Returns `room` with the meter baseline `period` should start from: the
    /// current readings of the room's latest invoice before `period`, whether
    /// or not that invoice is paid yet. Without an earlier invoice in
    /// `history` the room's own baseline is kept.
    pub fn baseline_for(
        &self,
        room: &RoomSnapshot,
        period: BillingPeriod,
        history: &[Invoice],
    ) -> RoomSnapshot {
        let previous = history
            .iter()
            .filter(|invoice| invoice.room_id() == room.room_id && invoice.period() < period)
            .max_by_key(|invoice| invoice.period());
        match previous {
            Some(previous) => RoomSnapshot {
                last_meter_water: previous.curr_water(),
                last_meter_elec: previous.curr_elec(),
                ..room.clone()
            },
            None => room.clone(),
        }
    }

    /// Fails when `history` already holds a later invoice for the same room.
    /// That invoice opened from this one's readings, so they can no longer
    /// change.
    pub fn ensure_latest(&self, invoice: &Invoice, history: &[Invoice]) -> BillingResult<()> {
        match later_invoice(invoice, history) {
            Some(later) => Err(BillingError::invalid_state(format!(
                "room {} is already billed for {}; readings of {} can no longer change",
                invoice.room_number(),
                later.period(),
                invoice.period()
            ))),
            None => Ok(()),
        }
    }

    /// Returns `room` with its meter baseline advanced to the invoice's
    /// current readings, ready for the next period.
    ///
    /// When `history` holds a later invoice for the room the baseline already
    /// belongs to that period and the room is returned unchanged.
    pub fn carry_forward(
        &self,
        room: &RoomSnapshot,
        invoice: &Invoice,
        history: &[Invoice],
    ) -> BillingResult<RoomSnapshot> {
        if room.room_id != invoice.room_id() {
            return Err(BillingError::validation(format!(
                "invoice {} belongs to room {}, not {}",
                invoice.id(),
                invoice.room_id(),
                room.room_id
            )));
        }
        if let Some(later) = later_invoice(invoice, history) {
            debug!(
                invoice_id = %invoice.id(),
                period = %invoice.period(),
                later = %later.period(),
                "room billed for a later period, baseline kept"
            );
            return Ok(room.clone());
        }
        Ok(RoomSnapshot {
            last_meter_water: invoice.curr_water(),
            last_meter_elec: invoice.curr_elec(),
            ..room.clone()
        })
    }
}

fn later_invoice<'a>(invoice: &Invoice, history: &'a [Invoice]) -> Option<&'a Invoice> {
    history
        .iter()
        .filter(|other| other.room_id() == invoice.room_id() && other.period() > invoice.period())
        .min_by_key(|other| other.period())
}
