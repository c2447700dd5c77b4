pub mod config;
pub mod error;
pub mod executor;
pub mod postgres_repositories;
pub mod repository;
pub mod service;
pub mod utils;

pub use config::DatabaseConfig;
pub use error::{to_billing_error, StaleWriteError};
pub use executor::{Executor, TransactionError, TransactionResult};
pub use postgres_repositories::{BillingRepositories, PostgresRepositories};
pub use repository::{InvoiceRepositoryImpl, RateConfigRepositoryImpl, RoomRepositoryImpl};
pub use service::BillingService;

#[cfg(test)]
pub mod test_helper;
