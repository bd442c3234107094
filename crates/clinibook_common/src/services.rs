// --- File: crates/clinibook_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! This module provides trait definitions for the external collaborators the
//! booking orchestrator depends on: the remote calendar and the notification
//! channel. The traits allow dependency injection and test doubles, keeping
//! the core decoupled from any specific provider SDK.
//!
//! Both collaborators are best-effort from the orchestrator's point of view:
//! their methods return explicit `Result`s, and the orchestrator is the
//! logging boundary that swallows failures instead of failing the booking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for
/// Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

impl BoxedError {
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }
}

/// A trait for external calendar synchronization.
///
/// Mirrors a booking's lifecycle into a remote calendar: event creation
/// (optionally provisioning a video-meeting link), update, deletion, and
/// listing the events of a single day for availability computation.
pub trait CalendarSync: Send + Sync {
    /// Error type returned by calendar operations.
    type Error: StdError + Send + Sync + 'static;

    /// Create a remote calendar event mirroring a booking.
    fn create_event(
        &self,
        calendar_id: &str,
        draft: EventDraft,
    ) -> BoxFuture<'_, EventCreation, Self::Error>;

    /// Update an existing remote event.
    fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        draft: EventDraft,
    ) -> BoxFuture<'_, EventUpdate, Self::Error>;

    /// Delete a remote event. Returns `true` when the event is gone
    /// (including when it never existed).
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, bool, Self::Error>;

    /// List the events of a single calendar day.
    fn events_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<DayEvent>, Self::Error>;
}

/// A trait for notification dispatch.
pub trait Notifier: Send + Sync {
    /// Error type returned by notification operations.
    type Error: StdError + Send + Sync + 'static;

    /// Send an email notification.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// The fields of a remote calendar event to be created or updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title.
    pub summary: String,
    /// Event body text.
    pub description: String,
    /// RFC 3339 start of the slot.
    pub start_time: String,
    /// RFC 3339 end of the slot (start + slot duration).
    pub end_time: String,
    /// Patient email to invite, when known.
    pub attendee_email: Option<String>,
    /// Request a video-meeting link for online appointments.
    pub with_meet_link: bool,
}

/// Result of a remote event creation.
///
/// `event_id` is `None` when the remote side accepted the call but returned
/// no event; callers treat that the same as a failure and leave the booking's
/// mirror fields unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCreation {
    pub event_id: Option<String>,
    pub meet_link: Option<String>,
}

/// Result of a remote event update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdate {
    pub success: bool,
    pub meet_link: Option<String>,
}

/// A single event of a calendar day, as returned by the remote calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEvent {
    pub event_id: String,
    pub summary: Option<String>,
    /// RFC 3339 start of the event.
    pub start_time: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
