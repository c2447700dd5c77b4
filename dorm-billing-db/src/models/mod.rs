pub mod identifiable;
pub mod invoice;
pub mod rate_config;
pub mod room;

// Re-exports
pub use identifiable::*;
pub use invoice::*;
pub use rate_config::*;
pub use room::*;
