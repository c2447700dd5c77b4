pub mod calculator;
pub mod due_date;
pub mod invoice_engine;
pub mod reporting;

pub use calculator::{compute_charges, compute_total, ChargeBreakdown};
pub use due_date::{DueDatePolicy, DEFAULT_DUE_DAY};
pub use invoice_engine::InvoiceEngine;
pub use reporting::{expected_rent, latest_invoice_for_room, summarize_period, PeriodSummary};
