pub mod invoice;
pub mod meter;
pub mod money;
pub mod period;
pub mod rate_config;
pub mod room;

pub use invoice::{Invoice, InvoiceParts};
pub use meter::{parse_meter_reading, usage_units, MeterKind};
pub use money::{round_money, MONEY_SCALE};
pub use period::BillingPeriod;
pub use rate_config::RateConfig;
pub use room::{room_number, RoomNumber, RoomSnapshot};
