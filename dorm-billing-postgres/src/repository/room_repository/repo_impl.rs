use dorm_billing_db::models::RoomModel;
use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

pub(super) const ROOM_COLUMNS: &str =
    "id, number, floor, price, status, last_meter_water, last_meter_elec, hash";

pub struct RoomRepositoryImpl {
    pub(super) executor: Executor,
}

impl RoomRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for RoomModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(RoomModel {
            id: row.try_get("id")?,
            number: get_heapless_string(row, "number")?,
            floor: row.try_get("floor")?,
            price: row.try_get("price")?,
            status: row.try_get("status")?,
            last_meter_water: row.try_get("last_meter_water")?,
            last_meter_elec: row.try_get("last_meter_elec")?,
            hash: row.try_get("hash")?,
        })
    }
}

pub(super) fn rows_to_models(rows: &[PgRow]) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
    rows.iter().map(RoomModel::try_from_row).collect()
}
