use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::invoice::Invoice;
use crate::domain::period::BillingPeriod;
use crate::domain::room::RoomSnapshot;

/// Collection figures for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub period: BillingPeriod,
    pub invoice_count: usize,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub billed_total: Decimal,
    pub collected_total: Decimal,
    pub outstanding_total: Decimal,
}

pub fn summarize_period(period: BillingPeriod, invoices: &[Invoice]) -> PeriodSummary {
    let mut summary = PeriodSummary {
        period,
        invoice_count: 0,
        paid_count: 0,
        unpaid_count: 0,
        billed_total: Decimal::ZERO,
        collected_total: Decimal::ZERO,
        outstanding_total: Decimal::ZERO,
    };

    for invoice in invoices.iter().filter(|invoice| invoice.period() == period) {
        summary.invoice_count += 1;
        summary.billed_total += invoice.total();
        if invoice.is_paid() {
            summary.paid_count += 1;
            summary.collected_total += invoice.total();
        } else {
            summary.unpaid_count += 1;
            summary.outstanding_total += invoice.total();
        }
    }
    summary
}

/// Most recent invoice of a room, as shown on the tenant portal.
pub fn latest_invoice_for_room(invoices: &[Invoice], room_id: Uuid) -> Option<&Invoice> {
    invoices
        .iter()
        .filter(|invoice| invoice.room_id() == room_id)
        .max_by_key(|invoice| invoice.period())
}

/// Monthly rent expected from the occupied rooms.
pub fn expected_rent(rooms: &[RoomSnapshot]) -> Decimal {
    rooms
        .iter()
        .filter(|room| room.occupied)
        .map(|room| room.rent_price)
        .sum()
}
