//! Google Calendar synchronization for Clinibook.
//!
//! Mirrors bookings into provider calendars over the Calendar v3 REST API.
//! The `CalendarSync` trait it implements lives in `clinibook_common`; this
//! crate contributes the HTTP client and token handling.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::GoogleCalendarClient;
pub use error::GcalError;
