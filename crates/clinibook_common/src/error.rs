// --- File: crates/clinibook_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The error taxonomy for booking operations.
///
/// The first five variants are fatal to the request that raised them and are
/// surfaced to the caller. `External` exists so that best-effort collaborators
/// (calendar sync, notification dispatch) can report failure as a value; the
/// orchestrator logs it and continues instead of returning it.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Malformed input shape (bad date/time format, invalid enum, missing required field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced user, provider, or appointment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested slot is already booked for that provider
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested date precedes today
    #[error("Cannot create appointments on past dates")]
    PastDate,

    /// A storage write failed while persisting the booking
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A best-effort external call failed (calendar or notification)
    #[error("External service error: {service_name} - {message}")]
    External {
        service_name: String,
        message: String,
    },
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Validation(_) => 400,
            BookingError::NotFound(_) => 404,
            BookingError::Conflict(_) => 409,
            BookingError::PastDate => 400,
            BookingError::Persistence(_) => 500,
            BookingError::External { .. } => 502,
        }
    }
}

// Utility functions for error construction
pub fn validation_error<T: fmt::Display>(message: T) -> BookingError {
    BookingError::Validation(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BookingError {
    BookingError::NotFound(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BookingError {
    BookingError::Conflict(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> BookingError {
    BookingError::Persistence(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> BookingError {
    BookingError::External {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(validation_error("bad time").status_code(), 400);
        assert_eq!(not_found("user").status_code(), 404);
        assert_eq!(conflict("slot taken").status_code(), 409);
        assert_eq!(BookingError::PastDate.status_code(), 400);
        assert_eq!(internal_error("db down").status_code(), 500);
        assert_eq!(external_service_error("gcal", "timeout").status_code(), 502);
    }

    #[test]
    fn external_error_reports_the_failing_service() {
        let err = external_service_error("calendar", "connect timeout");
        assert_eq!(
            err.to_string(),
            "External service error: calendar - connect timeout"
        );
    }

    #[test]
    fn conflict_message_is_preserved() {
        let err = conflict("An appointment already exists for Ada Lovelace at this date and time");
        assert!(err.to_string().contains("Ada Lovelace"));
    }
}
