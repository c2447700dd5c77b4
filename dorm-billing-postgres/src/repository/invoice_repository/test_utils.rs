use dorm_billing_api::{BillingPeriod, InvoiceEngine, RateConfig};
use dorm_billing_db::models::{InvoiceModel, RoomModel};
use rust_decimal_macros::dec;

pub fn test_rates() -> RateConfig {
    RateConfig::new(dec!(18), dec!(7), dec!(300)).expect("valid test rates")
}

/// Opens an invoice for `room` through the engine, as generation would.
pub fn create_test_invoice(room: &RoomModel, period: BillingPeriod) -> InvoiceModel {
    let snapshot = room.to_snapshot().expect("valid test room");
    let invoice = InvoiceEngine::default()
        .generate_invoices(period, &[snapshot], &test_rates())
        .expect("generation succeeds")
        .pop()
        .expect("test room is occupied");
    InvoiceModel::from_invoice(&invoice)
}
