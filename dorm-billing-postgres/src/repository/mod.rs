pub mod db_init;
pub mod invoice_repository;
pub mod rate_config_repository;
pub mod room_repository;

pub use invoice_repository::InvoiceRepositoryImpl;
pub use rate_config_repository::RateConfigRepositoryImpl;
pub use room_repository::RoomRepositoryImpl;
