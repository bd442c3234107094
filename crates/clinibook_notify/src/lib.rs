//! Notification dispatch for Clinibook.
//!
//! Composes booking confirmation emails and delivers them through an HTTP
//! mail relay. Delivery is best-effort from the booking pipeline's point of
//! view; failures are reported as explicit errors for the caller to log.

pub mod confirmation;
pub mod error;
pub mod mailer;

pub use confirmation::{appointment_confirmation, ComposedEmail};
pub use error::NotifyError;
pub use mailer::HttpMailer;
