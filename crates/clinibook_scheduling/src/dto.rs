//! Request and response payloads for the booking operations.

use crate::logic::normalize_slot_time;
use chrono::NaiveDate;
use clinibook_common::models::{Appointment, AppointmentType, Provider, User};
use clinibook_common::{validation_error, BookingError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An appointment with its patient and provider records attached. The read
/// and write endpoints return this shape, so callers never have to chase the
/// `user_id`/`provider_id` references themselves.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub user: User,
    pub provider: Provider,
}

/// Payload for creating an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentInput {
    pub date: NaiveDate,
    /// Slot start, `HH:MM`. Unpadded input is accepted and normalized.
    pub time: String,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub reason: String,
    pub user_id: Uuid,
    pub provider_id: Uuid,
}

impl CreateAppointmentInput {
    /// Validate the payload and normalize the slot time to its canonical
    /// zero-padded form.
    pub fn validated(mut self) -> Result<Self, BookingError> {
        if self.reason.trim().is_empty() {
            return Err(validation_error("Reason must not be empty"));
        }

        self.time = normalize_slot_time(&self.time)?;
        self.reason = self.reason.trim().to_string();
        Ok(self)
    }
}

/// Payload for partially updating an appointment. Absent fields keep their
/// stored value. Cancellation goes through the dedicated cancel operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentInput {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AppointmentType>,
    pub reason: Option<String>,
    pub confirmed: Option<bool>,
}

impl UpdateAppointmentInput {
    pub fn validated(mut self) -> Result<Self, BookingError> {
        if let Some(reason) = &self.reason {
            if reason.trim().is_empty() {
                return Err(validation_error("Reason must not be empty"));
            }
            self.reason = Some(reason.trim().to_string());
        }

        if let Some(time) = &self.time {
            self.time = Some(normalize_slot_time(time)?);
        }

        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.kind.is_none()
            && self.reason.is_none()
            && self.confirmed.is_none()
    }
}
