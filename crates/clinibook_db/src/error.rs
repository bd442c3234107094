//! Error types for the database client

use clinibook_common::BookingError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A unique constraint rejected the write (active slot already taken)
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A stored value could not be decoded into its entity field
    #[error("Database decode error: {0}")]
    DecodeError(String),
}

impl DbError {
    /// Classify a SQLx error, keeping unique violations distinguishable so
    /// the scheduling layer can surface them as booking conflicts.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let is_unique = matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
                || db_err.message().contains("UNIQUE");
            if is_unique {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
        }
        DbError::QueryError(err.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from_sqlx(err)
    }
}

impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(message) => BookingError::Conflict(message),
            other => BookingError::Persistence(other.to_string()),
        }
    }
}
