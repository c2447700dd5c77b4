use dorm_billing_api::{round_money, BillingError, RoomNumber, RoomSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::Identifiable;
use crate::utils::hash_as_i64;

/// # Documentation
/// - Row of the `room` table.
/// - `last_meter_water` / `last_meter_elec` are the baseline copied into the
///   next invoice and advanced when an invoice is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomModel {
    pub id: Uuid,
    pub number: RoomNumber,
    pub floor: i32,
    pub price: Decimal,
    pub status: RoomStatus,
    pub last_meter_water: i64,
    pub last_meter_elec: i64,
    pub hash: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "room_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Vacant,
    Occupied,
    Maintenance,
}

impl FromStr for RoomStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VACANT" => Ok(RoomStatus::Vacant),
            "OCCUPIED" => Ok(RoomStatus::Occupied),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            _ => Err(()),
        }
    }
}

impl RoomModel {
    pub fn is_occupied(&self) -> bool {
        self.status == RoomStatus::Occupied
    }

    pub fn compute_hash(&self) -> Result<i64, String> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing)
    }

    pub fn to_snapshot(&self) -> Result<RoomSnapshot, BillingError> {
        RoomSnapshot::new(
            self.id,
            self.number.as_str(),
            self.price,
            self.last_meter_water,
            self.last_meter_elec,
            self.is_occupied(),
        )
    }

    /// Applies the meter baseline of `snapshot` to this row. Every other
    /// column, including the stored hash, is kept.
    pub fn with_baseline_from(&self, snapshot: &RoomSnapshot) -> Self {
        Self {
            last_meter_water: snapshot.last_meter_water,
            last_meter_elec: snapshot.last_meter_elec,
            price: round_money(self.price),
            ..self.clone()
        }
    }
}

impl Identifiable for RoomModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
