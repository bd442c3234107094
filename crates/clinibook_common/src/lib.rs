// --- File: crates/clinibook_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error taxonomy shared across crates
pub mod logging; // Logging utilities
pub mod models; // Shared entity models
pub mod services; // Service abstractions (calendar sync, notifications)

// Re-export error types and utilities for easier access
pub use error::{
    conflict, external_service_error, internal_error, not_found, validation_error, BookingError,
    HttpStatusCode,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};
