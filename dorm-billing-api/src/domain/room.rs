use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::money::validate_non_negative_decimal;
use crate::error::{BillingError, BillingResult};

/// Limit in characters, matching the `VARCHAR(20)` columns.
pub const ROOM_NUMBER_MAX_LEN: usize = 20;

/// Buffer size in bytes: every character may take up to four in UTF-8.
pub const ROOM_NUMBER_MAX_BYTES: usize = ROOM_NUMBER_MAX_LEN * 4;

pub type RoomNumber = HeaplessString<ROOM_NUMBER_MAX_BYTES>;

pub fn room_number(value: &str) -> BillingResult<RoomNumber> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BillingError::validation("room number must not be empty"));
    }
    let too_long = || {
        BillingError::validation(format!(
            "room number '{value}' is too long (max {ROOM_NUMBER_MAX_LEN} characters)"
        ))
    };
    if value.chars().count() > ROOM_NUMBER_MAX_LEN {
        return Err(too_long());
    }
    RoomNumber::try_from(value).map_err(|_| too_long())
}

/// Read-only view of a room at the start of a billing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RoomSnapshot {
    pub room_id: Uuid,
    pub room_number: RoomNumber,
    #[validate(custom(function = "validate_non_negative_decimal"))]
    pub rent_price: Decimal,
    /// Carry-forward baseline for the next period.
    #[validate(range(min = 0))]
    pub last_meter_water: i64,
    #[validate(range(min = 0))]
    pub last_meter_elec: i64,
    pub occupied: bool,
}

impl RoomSnapshot {
    pub fn new(
        room_id: Uuid,
        number: &str,
        rent_price: Decimal,
        last_meter_water: i64,
        last_meter_elec: i64,
        occupied: bool,
    ) -> BillingResult<Self> {
        let room = Self {
            room_id,
            room_number: room_number(number)?,
            rent_price,
            last_meter_water,
            last_meter_elec,
            occupied,
        };
        room.validate()?;
        Ok(room)
    }
}
