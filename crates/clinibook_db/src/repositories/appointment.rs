//! Appointment record store
//!
//! Defines the storage contract for appointments. Implementations must keep
//! the slot-uniqueness invariant: at most one appointment with
//! `cancelled = false` per `(provider_id, date, time)` tuple, enforced
//! atomically at insert/update time rather than by a separate read.

use crate::error::DbError;
use chrono::NaiveDate;
use clinibook_common::models::{Appointment, AppointmentType};
use clinibook_common::services::BoxFuture;
use uuid::Uuid;

/// The fields the caller supplies when creating an appointment. Identity,
/// status flags and audit timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub date: NaiveDate,
    /// Zero-padded `HH:MM` slot start.
    pub time: String,
    pub kind: AppointmentType,
    pub reason: String,
    pub user_id: Uuid,
    pub provider_id: Uuid,
}

/// Storage contract for appointment records.
pub trait AppointmentRepository: Send + Sync {
    /// Create tables and indexes if they do not exist.
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new appointment.
    ///
    /// Fails with `DbError::UniqueViolation` when an active appointment
    /// already occupies the `(provider_id, date, time)` slot; the check and
    /// the insert are a single atomic operation.
    fn insert(&self, appointment: NewAppointment) -> BoxFuture<'_, Appointment, DbError>;

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, DbError>;

    /// All appointments ordered by (date, time) ascending.
    fn find_all(&self) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    fn find_by_user(&self, user_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    fn find_by_provider(&self, provider_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    /// Active appointments strictly after `today`, ascending.
    fn find_upcoming(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    /// Active appointments strictly before `today`, descending.
    fn find_past(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    /// Active appointments of one provider on one day.
    fn find_active_for_day(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, DbError>;

    /// Look up the active appointment occupying the exact slot, if any.
    /// `exclude` skips one record by id (the update path excludes itself).
    fn find_active_slot(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: &str,
        exclude: Option<Uuid>,
    ) -> BoxFuture<'_, Option<Appointment>, DbError>;

    /// Persist the given state of an existing appointment.
    ///
    /// Subject to the same uniqueness guard as `insert` when the record is
    /// active and its slot changed.
    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, DbError>;

    /// Hard-delete a record. Returns `true` when a row was removed.
    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, DbError>;
}
