//! Database access for Clinibook
//!
//! Provides a database-agnostic client built on SQLx plus the repository
//! traits the scheduling core depends on. SQL implementations target SQLite
//! by default; in-memory implementations back tests and database-less runs.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use repositories::{
    AppointmentRepository, InMemoryAppointmentRepository, InMemoryProviderRepository,
    InMemoryUserRepository, NewAppointment, NewProvider, NewUser, ProviderRepository,
    SqlAppointmentRepository, SqlProviderRepository, SqlUserRepository, UserRepository,
};
