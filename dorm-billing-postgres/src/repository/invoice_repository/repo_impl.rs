use dorm_billing_db::models::InvoiceModel;
use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub(super) const INVOICE_COLUMNS: &str = "id, room_id, room_number, period_year, period_month, \
    prev_water, curr_water, prev_elec, curr_elec, water_units, elec_units, \
    rent_price, water_charge, elec_charge, total, is_paid, due_date, hash";

pub struct InvoiceRepositoryImpl {
    pub(super) executor: Executor,
}

impl InvoiceRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for InvoiceModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(InvoiceModel {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            room_number: get_heapless_string(row, "room_number")?,
            period_year: row.try_get("period_year")?,
            period_month: row.try_get("period_month")?,
            prev_water: row.try_get("prev_water")?,
            curr_water: row.try_get("curr_water")?,
            prev_elec: row.try_get("prev_elec")?,
            curr_elec: row.try_get("curr_elec")?,
            water_units: row.try_get("water_units")?,
            elec_units: row.try_get("elec_units")?,
            rent_price: row.try_get("rent_price")?,
            water_charge: row.try_get("water_charge")?,
            elec_charge: row.try_get("elec_charge")?,
            total: row.try_get("total")?,
            is_paid: row.try_get("is_paid")?,
            due_date: row.try_get("due_date")?,
            hash: row.try_get("hash")?,
        })
    }
}

pub(super) fn rows_to_models(rows: &[PgRow]) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
    rows.iter().map(InvoiceModel::try_from_row).collect()
}
