//! In-memory repository implementations
//!
//! Used for tests and for running the service without a database. Each store
//! holds its records behind a single `Mutex`, which makes the slot check and
//! the insert one atomic step, the same guarantee the SQL stores get from
//! their partial unique index.

use crate::error::DbError;
use crate::repositories::appointment::{AppointmentRepository, NewAppointment};
use crate::repositories::provider::{NewProvider, ProviderRepository};
use crate::repositories::user::{NewUser, UserRepository};
use chrono::{NaiveDate, Utc};
use clinibook_common::models::{Appointment, Provider, ProviderStatus, User};
use clinibook_common::services::BoxFuture;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory implementation of the appointment repository
#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    records: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slot_taken(
    records: &HashMap<Uuid, Appointment>,
    provider_id: Uuid,
    date: NaiveDate,
    time: &str,
    exclude: Option<Uuid>,
) -> bool {
    records.values().any(|a| {
        !a.cancelled
            && a.provider_id == provider_id
            && a.date == date
            && a.time == time
            && exclude.map_or(true, |id| a.id != id)
    })
}

fn by_schedule(a: &Appointment, b: &Appointment) -> std::cmp::Ordering {
    a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time))
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move { Ok(()) })
    }

    fn insert(&self, appointment: NewAppointment) -> BoxFuture<'_, Appointment, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            if slot_taken(
                &records,
                appointment.provider_id,
                appointment.date,
                &appointment.time,
                None,
            ) {
                return Err(DbError::UniqueViolation(format!(
                    "active appointment already exists for provider {} on {} at {}",
                    appointment.provider_id, appointment.date, appointment.time
                )));
            }

            let now = Utc::now();
            let record = Appointment {
                id: Uuid::new_v4(),
                date: appointment.date,
                time: appointment.time,
                kind: appointment.kind,
                reason: appointment.reason,
                confirmed: false,
                cancelled: false,
                user_id: appointment.user_id,
                provider_id: appointment.provider_id,
                google_event_id: None,
                google_meet_link: None,
                created_at: now,
                updated_at: now,
            };

            records.insert(record.id, record.clone());
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, DbError> {
        Box::pin(async move { Ok(self.records.lock().unwrap().get(&id).cloned()) })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by(by_schedule);
            Ok(all)
        })
    }

    fn find_by_user(&self, user_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect();
            found.sort_by(by_schedule);
            Ok(found)
        })
    }

    fn find_by_provider(&self, provider_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.provider_id == provider_id)
                .cloned()
                .collect();
            found.sort_by(by_schedule);
            Ok(found)
        })
    }

    fn find_upcoming(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|a| !a.cancelled && a.date > today)
                .cloned()
                .collect();
            found.sort_by(by_schedule);
            Ok(found)
        })
    }

    fn find_past(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|a| !a.cancelled && a.date < today)
                .cloned()
                .collect();
            found.sort_by(|a, b| by_schedule(b, a));
            Ok(found)
        })
    }

    fn find_active_for_day(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|a| !a.cancelled && a.provider_id == provider_id && a.date == date)
                .cloned()
                .collect();
            found.sort_by(|a, b| a.time.cmp(&b.time));
            Ok(found)
        })
    }

    fn find_active_slot(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: &str,
        exclude: Option<Uuid>,
    ) -> BoxFuture<'_, Option<Appointment>, DbError> {
        let time = time.to_string();

        Box::pin(async move {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|a| {
                    !a.cancelled
                        && a.provider_id == provider_id
                        && a.date == date
                        && a.time == time
                        && exclude.map_or(true, |id| a.id != id)
                })
                .cloned())
        })
    }

    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            if !records.contains_key(&appointment.id) {
                return Err(DbError::QueryError(format!(
                    "appointment {} not found",
                    appointment.id
                )));
            }

            if !appointment.cancelled
                && slot_taken(
                    &records,
                    appointment.provider_id,
                    appointment.date,
                    &appointment.time,
                    Some(appointment.id),
                )
            {
                return Err(DbError::UniqueViolation(format!(
                    "active appointment already exists for provider {} on {} at {}",
                    appointment.provider_id, appointment.date, appointment.time
                )));
            }

            records.insert(appointment.id, appointment.clone());
            Ok(appointment)
        })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, DbError> {
        Box::pin(async move { Ok(self.records.lock().unwrap().remove(&id).is_some()) })
    }
}

/// In-memory implementation of the provider repository
#[derive(Debug, Default)]
pub struct InMemoryProviderRepository {
    records: Mutex<HashMap<Uuid, Provider>>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProviderRepository for InMemoryProviderRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move { Ok(()) })
    }

    fn insert(&self, provider: NewProvider) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            if records
                .values()
                .any(|p| p.email == provider.email || p.calendar_id == provider.calendar_id)
            {
                return Err(DbError::UniqueViolation(format!(
                    "provider with email {} or calendar {} already exists",
                    provider.email, provider.calendar_id
                )));
            }

            let now = Utc::now();
            let record = Provider {
                id: Uuid::new_v4(),
                first_name: provider.first_name,
                last_name: provider.last_name,
                email: provider.email,
                phone: provider.phone,
                specialty: provider.specialty,
                description: provider.description,
                calendar_id: provider.calendar_id,
                key_path: provider.key_path,
                status: ProviderStatus::Active,
                created_at: now,
                updated_at: now,
            };

            records.insert(record.id, record.clone());
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Provider>, DbError> {
        Box::pin(async move { Ok(self.records.lock().unwrap().get(&id).cloned()) })
    }

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Provider>, DbError> {
        let email = email.to_string();

        Box::pin(async move {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|p| p.email == email)
                .cloned())
        })
    }

    fn find_active(&self) -> BoxFuture<'_, Vec<Provider>, DbError> {
        Box::pin(async move {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.status == ProviderStatus::Active)
                .cloned()
                .collect();
            found.sort_by(|a, b| a.first_name.cmp(&b.first_name));
            Ok(found)
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Provider>, DbError> {
        Box::pin(async move {
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| a.first_name.cmp(&b.first_name));
            Ok(all)
        })
    }

    fn update(&self, provider: Provider) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            if !records.contains_key(&provider.id) {
                return Err(DbError::QueryError(format!(
                    "provider {} not found",
                    provider.id
                )));
            }

            records.insert(provider.id, provider.clone());
            Ok(provider)
        })
    }

    fn set_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            let record = records
                .get_mut(&id)
                .ok_or_else(|| DbError::QueryError(format!("provider {id} not found")))?;
            record.status = status;
            record.updated_at = Utc::now();
            Ok(record.clone())
        })
    }
}

/// In-memory implementation of the user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    records: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move { Ok(()) })
    }

    fn insert(&self, user: NewUser) -> BoxFuture<'_, User, DbError> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();

            if records.values().any(|u| u.email == user.email) {
                return Err(DbError::UniqueViolation(format!(
                    "user with email {} already exists",
                    user.email
                )));
            }

            let record = User {
                id: Uuid::new_v4(),
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone: user.phone,
            };

            records.insert(record.id, record.clone());
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<User>, DbError> {
        Box::pin(async move { Ok(self.records.lock().unwrap().get(&id).cloned()) })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<User>, DbError> {
        Box::pin(async move {
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| {
                a.last_name
                    .cmp(&b.last_name)
                    .then_with(|| a.first_name.cmp(&b.first_name))
            });
            Ok(all)
        })
    }
}
