//! Repository traits and implementations

pub mod appointment;
pub mod appointment_sql;
pub mod memory;
pub mod provider;
pub mod provider_sql;
pub mod user;
pub mod user_sql;

pub use appointment::{AppointmentRepository, NewAppointment};
pub use appointment_sql::SqlAppointmentRepository;
pub use memory::{InMemoryAppointmentRepository, InMemoryProviderRepository, InMemoryUserRepository};
pub use provider::{NewProvider, ProviderRepository};
pub use provider_sql::SqlProviderRepository;
pub use user::{NewUser, UserRepository};
pub use user_sql::SqlUserRepository;
