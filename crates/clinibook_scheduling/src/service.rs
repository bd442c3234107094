//! Booking orchestration.
//!
//! `AppointmentService` runs the booking pipeline: validate, persist, then
//! mirror into the remote calendar and notify the patient. The mirror and
//! notification steps are best-effort: their failures are logged here and
//! never fail the booking itself. Collaborators are injected as trait
//! objects so tests can substitute doubles.

use crate::dto::{AppointmentView, CreateAppointmentInput, UpdateAppointmentInput};
use crate::logic::{combine_date_time, generate_slots, open_slots};
use chrono::{DateTime, NaiveDate, Utc};
use clinibook_common::models::{
    Appointment, AppointmentType, Provider, ProviderStatus, User,
};
use clinibook_common::services::{BoxedError, CalendarSync, EventDraft, Notifier};
use clinibook_common::{
    conflict, external_service_error, not_found, validation_error, BookingError,
};
use clinibook_config::SchedulingConfig;
use clinibook_db::{
    AppointmentRepository, DbError, NewAppointment, ProviderRepository, UserRepository,
};
use clinibook_notify::appointment_confirmation;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Shared handle to the remote calendar collaborator.
pub type SharedCalendar = Arc<dyn CalendarSync<Error = BoxedError>>;
/// Shared handle to the notification collaborator.
pub type SharedNotifier = Arc<dyn Notifier<Error = BoxedError>>;

/// The booking orchestrator.
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    providers: Arc<dyn ProviderRepository>,
    users: Arc<dyn UserRepository>,
    calendar: Option<SharedCalendar>,
    notifier: Option<SharedNotifier>,
    scheduling: SchedulingConfig,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        providers: Arc<dyn ProviderRepository>,
        users: Arc<dyn UserRepository>,
        calendar: Option<SharedCalendar>,
        notifier: Option<SharedNotifier>,
        scheduling: SchedulingConfig,
    ) -> Self {
        Self {
            appointments,
            providers,
            users,
            calendar,
            notifier,
            scheduling,
        }
    }

    fn slot_conflict(provider: &Provider) -> BookingError {
        conflict(&format!(
            "An appointment already exists for {} at this date and time",
            provider.display_name()
        ))
    }

    async fn require_user(&self, id: Uuid) -> Result<User, BookingError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(&format!("User with ID {id} not found")))
    }

    async fn require_provider(&self, id: Uuid) -> Result<Provider, BookingError> {
        self.providers
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(&format!("Provider with ID {id} not found")))
    }

    /// Book an appointment.
    ///
    /// Pipeline: validate the payload, check both parties exist and the
    /// provider is accepting bookings, reject past dates, then persist. The
    /// store's uniqueness guard decides slot ownership under concurrency; an
    /// advisory pre-check keeps the friendly conflict message for the common
    /// case. Calendar mirroring and the confirmation email follow
    /// best-effort.
    pub async fn create(
        &self,
        input: CreateAppointmentInput,
    ) -> Result<Appointment, BookingError> {
        let input = input.validated()?;

        let user = self.require_user(input.user_id).await?;
        let provider = self.require_provider(input.provider_id).await?;

        if provider.status != ProviderStatus::Active {
            return Err(validation_error(&format!(
                "Provider {} is not accepting appointments",
                provider.display_name()
            )));
        }

        if input.date < Utc::now().date_naive() {
            return Err(BookingError::PastDate);
        }

        if self
            .appointments
            .find_active_slot(input.provider_id, input.date, &input.time, None)
            .await?
            .is_some()
        {
            return Err(Self::slot_conflict(&provider));
        }

        let record = NewAppointment {
            date: input.date,
            time: input.time,
            kind: input.kind,
            reason: input.reason,
            user_id: input.user_id,
            provider_id: input.provider_id,
        };

        // The pre-check above is advisory; a concurrent writer may still win
        // the slot between the check and this insert.
        let created = match self.appointments.insert(record).await {
            Ok(appointment) => appointment,
            Err(DbError::UniqueViolation(_)) => return Err(Self::slot_conflict(&provider)),
            Err(other) => return Err(other.into()),
        };

        info!(
            "Appointment {} booked for provider {} on {} at {}",
            created.id, created.provider_id, created.date, created.time
        );

        let created = self.mirror_creation(created, &user, &provider).await;
        self.send_confirmation(&created, &user, &provider).await;

        Ok(created)
    }

    fn event_draft(
        &self,
        appointment: &Appointment,
        user: &User,
        provider: &Provider,
    ) -> Result<EventDraft, BookingError> {
        let start = combine_date_time(appointment.date, &appointment.time, 0)?;
        let end = combine_date_time(
            appointment.date,
            &appointment.time,
            u32::from(self.scheduling.slot_duration_minutes),
        )?;

        Ok(EventDraft {
            summary: format!(
                "{} Appointment - {}",
                appointment.kind.as_str().to_uppercase(),
                user.display_name()
            ),
            description: format!(
                "Reason: {}\nPatient: {}\nEmail: {}\nPhone: {}\nProvider: {}",
                appointment.reason,
                user.display_name(),
                user.email,
                user.phone.as_deref().unwrap_or("-"),
                provider.display_name()
            ),
            start_time: start.to_rfc3339(),
            end_time: end.to_rfc3339(),
            attendee_email: Some(user.email.clone()),
            with_meet_link: appointment.kind == AppointmentType::Online,
        })
    }

    /// Mirror a fresh booking into the provider's remote calendar and stamp
    /// the mirror fields onto the record. Failures leave the booking intact.
    async fn mirror_creation(
        &self,
        mut appointment: Appointment,
        user: &User,
        provider: &Provider,
    ) -> Appointment {
        let Some(calendar) = &self.calendar else {
            return appointment;
        };

        let draft = match self.event_draft(&appointment, user, provider) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    "Skipping calendar mirror for appointment {}: {}",
                    appointment.id, err
                );
                return appointment;
            }
        };

        match calendar.create_event(&provider.calendar_id, draft).await {
            Ok(creation) => {
                let Some(event_id) = creation.event_id else {
                    warn!(
                        "Calendar returned no event for appointment {}",
                        appointment.id
                    );
                    return appointment;
                };

                appointment.google_event_id = Some(event_id);
                appointment.google_meet_link = creation.meet_link;
                appointment.updated_at = Utc::now();

                match self.appointments.update(appointment.clone()).await {
                    Ok(saved) => saved,
                    Err(err) => {
                        warn!(
                            "Failed to persist calendar fields for appointment {}: {}",
                            appointment.id, err
                        );
                        appointment
                    }
                }
            }
            Err(err) => {
                let err = external_service_error("calendar", err);
                warn!(
                    "Failed to create calendar event for appointment {}: {}",
                    appointment.id, err
                );
                appointment
            }
        }
    }

    async fn send_confirmation(&self, appointment: &Appointment, user: &User, provider: &Provider) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let email = appointment_confirmation(appointment, user, provider);
        match notifier
            .send_email(&user.email, &email.subject, &email.html_body, true)
            .await
        {
            Ok(result) => info!(
                "Confirmation email for appointment {} accepted with status '{}'",
                appointment.id, result.status
            ),
            Err(err) => {
                let err = external_service_error("email", err);
                warn!(
                    "Failed to send confirmation email for appointment {}: {}",
                    appointment.id, err
                );
            }
        }
    }

    /// Attach the patient and provider records to an appointment.
    pub async fn view(&self, appointment: Appointment) -> Result<AppointmentView, BookingError> {
        let user = self.require_user(appointment.user_id).await?;
        let provider = self.require_provider(appointment.provider_id).await?;
        Ok(AppointmentView {
            appointment,
            user,
            provider,
        })
    }

    /// Attach the related records to a whole listing, fetching each party
    /// once no matter how often it recurs.
    pub async fn views(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentView>, BookingError> {
        let mut users: HashMap<Uuid, User> = HashMap::new();
        let mut providers: HashMap<Uuid, Provider> = HashMap::new();
        let mut views = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            if !users.contains_key(&appointment.user_id) {
                let user = self.require_user(appointment.user_id).await?;
                users.insert(appointment.user_id, user);
            }
            if !providers.contains_key(&appointment.provider_id) {
                let provider = self.require_provider(appointment.provider_id).await?;
                providers.insert(appointment.provider_id, provider);
            }
            views.push(AppointmentView {
                user: users[&appointment.user_id].clone(),
                provider: providers[&appointment.provider_id].clone(),
                appointment,
            });
        }

        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, BookingError> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(&format!("Appointment with ID {id} not found")))
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.appointments.find_all().await?)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.appointments.find_by_user(user_id).await?)
    }

    pub async fn list_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.appointments.find_by_provider(provider_id).await?)
    }

    pub async fn list_upcoming(&self) -> Result<Vec<Appointment>, BookingError> {
        Ok(self
            .appointments
            .find_upcoming(Utc::now().date_naive())
            .await?)
    }

    pub async fn list_past(&self) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.appointments.find_past(Utc::now().date_naive()).await?)
    }

    /// Apply a partial update. Moving an active appointment to another slot
    /// is subject to the same past-date and conflict rules as creation; the
    /// record never conflicts with its own current slot.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAppointmentInput,
    ) -> Result<Appointment, BookingError> {
        let input = input.validated()?;
        let mut appointment = self.get(id).await?;

        let new_date = input.date.unwrap_or(appointment.date);
        let new_time = input
            .time
            .clone()
            .unwrap_or_else(|| appointment.time.clone());
        let slot_changed = new_date != appointment.date || new_time != appointment.time;
        let details_changed = matches!(input.kind, Some(kind) if kind != appointment.kind)
            || matches!(&input.reason, Some(reason) if *reason != appointment.reason);

        if slot_changed {
            if new_date < Utc::now().date_naive() {
                return Err(BookingError::PastDate);
            }

            if !appointment.cancelled
                && self
                    .appointments
                    .find_active_slot(appointment.provider_id, new_date, &new_time, Some(id))
                    .await?
                    .is_some()
            {
                let provider = self.require_provider(appointment.provider_id).await?;
                return Err(Self::slot_conflict(&provider));
            }
        }

        appointment.date = new_date;
        appointment.time = new_time;
        if let Some(kind) = input.kind {
            appointment.kind = kind;
        }
        if let Some(reason) = input.reason {
            appointment.reason = reason;
        }
        if let Some(confirmed) = input.confirmed {
            appointment.confirmed = confirmed;
        }
        appointment.updated_at = Utc::now();

        let updated = match self.appointments.update(appointment).await {
            Ok(appointment) => appointment,
            Err(DbError::UniqueViolation(_)) => {
                let appointment = self.get(id).await?;
                let provider = self.require_provider(appointment.provider_id).await?;
                return Err(Self::slot_conflict(&provider));
            }
            Err(other) => return Err(other.into()),
        };

        let updated = if slot_changed || details_changed {
            self.mirror_update(updated).await
        } else {
            updated
        };

        Ok(updated)
    }

    /// Push the edited slot or details to the mirrored remote event,
    /// best-effort. A meeting link refreshed by the remote side is persisted
    /// back onto the record.
    async fn mirror_update(&self, mut appointment: Appointment) -> Appointment {
        let Some(calendar) = &self.calendar else {
            return appointment;
        };
        let Some(event_id) = appointment.google_event_id.clone() else {
            return appointment;
        };

        let (user, provider) = match (
            self.require_user(appointment.user_id).await,
            self.require_provider(appointment.provider_id).await,
        ) {
            (Ok(user), Ok(provider)) => (user, provider),
            (Err(err), _) | (_, Err(err)) => {
                warn!(
                    "Skipping calendar update for appointment {}: {}",
                    appointment.id, err
                );
                return appointment;
            }
        };

        let draft = match self.event_draft(&appointment, &user, &provider) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    "Skipping calendar update for appointment {}: {}",
                    appointment.id, err
                );
                return appointment;
            }
        };

        match calendar
            .update_event(&provider.calendar_id, &event_id, draft)
            .await
        {
            Ok(update) if update.success => {
                info!(
                    "Calendar event {} updated for appointment {}",
                    event_id, appointment.id
                );

                if update.meet_link.is_some() && update.meet_link != appointment.google_meet_link {
                    appointment.google_meet_link = update.meet_link;
                    appointment.updated_at = Utc::now();
                    match self.appointments.update(appointment.clone()).await {
                        Ok(saved) => return saved,
                        Err(err) => warn!(
                            "Failed to persist refreshed meeting link for appointment {}: {}",
                            appointment.id, err
                        ),
                    }
                }
                appointment
            }
            Ok(_) => {
                warn!(
                    "Calendar rejected update of event {} for appointment {}",
                    event_id, appointment.id
                );
                appointment
            }
            Err(err) => {
                let err = external_service_error("calendar", err);
                warn!(
                    "Failed to update calendar event for appointment {}: {}",
                    appointment.id, err
                );
                appointment
            }
        }
    }

    /// Mark an appointment confirmed. Idempotent.
    pub async fn confirm(&self, id: Uuid) -> Result<Appointment, BookingError> {
        let mut appointment = self.get(id).await?;
        if appointment.confirmed {
            return Ok(appointment);
        }

        appointment.confirmed = true;
        appointment.updated_at = Utc::now();
        Ok(self.appointments.update(appointment).await?)
    }

    /// Cancel an appointment, freeing its slot. Idempotent. The mirrored
    /// remote event is deleted best-effort and the mirror fields are cleared
    /// either way.
    pub async fn cancel(&self, id: Uuid) -> Result<Appointment, BookingError> {
        let mut appointment = self.get(id).await?;
        if appointment.cancelled {
            return Ok(appointment);
        }

        self.delete_remote_event(&appointment).await;

        appointment.cancelled = true;
        appointment.google_event_id = None;
        appointment.google_meet_link = None;
        appointment.updated_at = Utc::now();

        let cancelled = self.appointments.update(appointment).await?;
        info!("Appointment {} cancelled", cancelled.id);
        Ok(cancelled)
    }

    async fn delete_remote_event(&self, appointment: &Appointment) {
        let Some(calendar) = &self.calendar else {
            return;
        };
        let Some(event_id) = &appointment.google_event_id else {
            return;
        };

        let provider = match self.require_provider(appointment.provider_id).await {
            Ok(provider) => provider,
            Err(err) => {
                warn!(
                    "Skipping calendar deletion for appointment {}: {}",
                    appointment.id, err
                );
                return;
            }
        };

        match calendar
            .delete_event(&provider.calendar_id, event_id)
            .await
        {
            Ok(_) => info!(
                "Calendar event {} removed for appointment {}",
                event_id, appointment.id
            ),
            Err(err) => {
                let err = external_service_error("calendar", err);
                warn!(
                    "Failed to delete calendar event for appointment {}: {}",
                    appointment.id, err
                );
            }
        }
    }

    /// Hard-delete an appointment record and return its last state.
    pub async fn remove(&self, id: Uuid) -> Result<Appointment, BookingError> {
        let appointment = self.get(id).await?;

        self.delete_remote_event(&appointment).await;
        self.appointments.delete(id).await?;

        info!("Appointment {} removed", id);
        Ok(appointment)
    }

    /// Compute the open slots of a provider's working day.
    ///
    /// Days that already passed have no availability; they return an empty
    /// sequence without consulting the store or the remote calendar. For
    /// today and later, the full slot grid is reduced by the stored active
    /// bookings and, when the calendar collaborator is available, by the
    /// remote events of that day. A remote listing failure degrades to
    /// store-only availability instead of failing the call.
    pub async fn available_slots(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, BookingError> {
        let provider = self.require_provider(provider_id).await?;

        if date < Utc::now().date_naive() {
            return Ok(Vec::new());
        }

        let grid = generate_slots(
            &self.scheduling.work_start,
            &self.scheduling.work_end,
            u32::from(self.scheduling.slot_duration_minutes),
        )?;

        let mut occupied: Vec<String> = self
            .appointments
            .find_active_for_day(provider_id, date)
            .await?
            .into_iter()
            .map(|appointment| appointment.time)
            .collect();

        if let Some(calendar) = &self.calendar {
            match calendar.events_for_day(&provider.calendar_id, date).await {
                Ok(events) => {
                    for event in events {
                        match DateTime::parse_from_rfc3339(&event.start_time) {
                            Ok(start) => occupied.push(start.format("%H:%M").to_string()),
                            Err(err) => warn!(
                                "Ignoring calendar event {} with unparseable start '{}': {}",
                                event.event_id, event.start_time, err
                            ),
                        }
                    }
                }
                Err(err) => {
                    let err = external_service_error("calendar", err);
                    warn!(
                        "Calendar listing failed for provider {}, using stored bookings only: {}",
                        provider_id, err
                    );
                }
            }
        }

        Ok(open_slots(grid, &occupied))
    }
}
