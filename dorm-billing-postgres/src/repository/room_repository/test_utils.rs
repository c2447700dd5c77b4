use dorm_billing_api::room_number;
use dorm_billing_db::models::{RoomModel, RoomStatus};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Occupied room at rent 3000 with meters at 100 / 500. The number gets a
/// random suffix so rows committed by service tests never collide.
pub fn create_test_room(number: &str) -> RoomModel {
    let suffix = Uuid::new_v4().simple().to_string();
    RoomModel {
        id: Uuid::new_v4(),
        number: room_number(&format!("{number}-{}", &suffix[..8])).expect("valid room number"),
        floor: 1,
        price: dec!(3000.00),
        status: RoomStatus::Occupied,
        last_meter_water: 100,
        last_meter_elec: 500,
        hash: 0,
    }
}
