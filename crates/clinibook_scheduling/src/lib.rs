//! Appointment scheduling core for Clinibook.
//!
//! Owns the slot grid of the working day, the conflict rules that keep one
//! active booking per provider slot, and the booking orchestrator that ties
//! storage, remote calendar mirroring and patient notification together.

pub mod dto;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod routes;
pub mod service;
#[cfg(test)]
mod service_test;

pub use dto::{AppointmentView, CreateAppointmentInput, UpdateAppointmentInput};
pub use service::{AppointmentService, SharedCalendar, SharedNotifier};
