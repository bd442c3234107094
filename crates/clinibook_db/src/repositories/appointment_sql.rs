//! SQL implementation of the appointment record store
//!
//! The slot-uniqueness invariant is enforced by a partial unique index on
//! `(provider_id, date, time)` restricted to `cancelled = 0`, so concurrent
//! inserts for the same slot cannot both succeed regardless of what any
//! earlier read returned.

use crate::error::DbError;
use crate::repositories::appointment::{AppointmentRepository, NewAppointment};
use crate::DbClient;
use chrono::{DateTime, NaiveDate, Utc};
use clinibook_common::models::{Appointment, AppointmentType};
use clinibook_common::services::BoxFuture;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

const DATE_FMT: &str = "%Y-%m-%d";

/// SQL implementation of the appointment repository
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FMT)
        .map_err(|e| DbError::DecodeError(format!("bad date '{value}': {e}")))
}

fn parse_uuid(value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::DecodeError(format!("bad uuid '{value}': {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("bad timestamp '{value}': {e}")))
}

// DateTime<Utc> does not decode through sqlx::Any, so timestamps and dates
// are stored as TEXT and mapped by hand.
fn map_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let date: String = row
        .try_get("date")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let time: String = row
        .try_get("time")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let kind: String = row
        .try_get("kind")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let reason: String = row
        .try_get("reason")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let confirmed: i64 = row
        .try_get("confirmed")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let cancelled: i64 = row
        .try_get("cancelled")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let user_id: String = row
        .try_get("user_id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let provider_id: String = row
        .try_get("provider_id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let google_event_id: Option<String> = row
        .try_get("google_event_id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let google_meet_link: Option<String> = row
        .try_get("google_meet_link")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

    Ok(Appointment {
        id: parse_uuid(&id)?,
        date: parse_date(&date)?,
        time,
        kind: AppointmentType::parse(&kind)
            .ok_or_else(|| DbError::DecodeError(format!("bad appointment type '{kind}'")))?,
        reason,
        confirmed: confirmed != 0,
        cancelled: cancelled != 0,
        user_id: parse_uuid(&user_id)?,
        provider_id: parse_uuid(&provider_id)?,
        google_event_id,
        google_meet_link,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

impl AppointmentRepository for SqlAppointmentRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing appointment schema");

            let table = r#"
                CREATE TABLE IF NOT EXISTS appointments (
                    id TEXT PRIMARY KEY,
                    date TEXT NOT NULL,
                    time TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    reason TEXT NOT NULL,
                    confirmed INTEGER NOT NULL DEFAULT 0,
                    cancelled INTEGER NOT NULL DEFAULT 0,
                    user_id TEXT NOT NULL,
                    provider_id TEXT NOT NULL,
                    google_event_id TEXT,
                    google_meet_link TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(table).await?;

            // Cancelled appointments free their slot, so the uniqueness guard
            // only covers active rows.
            let slot_index = r#"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot
                ON appointments (provider_id, date, time)
                WHERE cancelled = 0
            "#;
            self.db_client.execute(slot_index).await?;

            info!("Appointment schema initialized successfully");
            Ok(())
        })
    }

    fn insert(&self, appointment: NewAppointment) -> BoxFuture<'_, Appointment, DbError> {
        Box::pin(async move {
            debug!(
                "Inserting appointment for provider {} on {} at {}",
                appointment.provider_id, appointment.date, appointment.time
            );

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

            let query = r#"
                INSERT INTO appointments
                    (id, date, time, kind, reason, confirmed, cancelled,
                     user_id, provider_id, google_event_id, google_meet_link,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#;

            sqlx::query(query)
                .bind(record.id.to_string())
                .bind(format_date(record.date))
                .bind(&record.time)
                .bind(record.kind.as_str())
                .bind(&record.reason)
                .bind(i64::from(record.confirmed))
                .bind(i64::from(record.cancelled))
                .bind(record.user_id.to_string())
                .bind(record.provider_id.to_string())
                .bind(&record.google_event_id)
                .bind(&record.google_meet_link)
                .bind(record.created_at.to_rfc3339())
                .bind(record.updated_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert appointment: {}", e);
                    DbError::from_sqlx(e)
                })?;

            info!("Appointment {} created", record.id);
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, DbError> {
        Box::pin(async move {
            let query = "SELECT * FROM appointments WHERE id = $1";

            let row = sqlx::query(query)
                .bind(id.to_string())
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            row.as_ref().map(map_row).transpose()
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let query = "SELECT * FROM appointments ORDER BY date ASC, time ASC";

            let rows = sqlx::query(query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_by_user(&self, user_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let query =
                "SELECT * FROM appointments WHERE user_id = $1 ORDER BY date ASC, time ASC";

            let rows = sqlx::query(query)
                .bind(user_id.to_string())
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_by_provider(&self, provider_id: Uuid) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let query =
                "SELECT * FROM appointments WHERE provider_id = $1 ORDER BY date ASC, time ASC";

            let rows = sqlx::query(query)
                .bind(provider_id.to_string())
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_upcoming(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            // ISO-formatted dates order lexicographically, so TEXT comparison
            // is date comparison.
            let query = r#"
                SELECT * FROM appointments
                WHERE date > $1 AND cancelled = 0
                ORDER BY date ASC, time ASC
            "#;

            let rows = sqlx::query(query)
                .bind(format_date(today))
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_past(&self, today: NaiveDate) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let query = r#"
                SELECT * FROM appointments
                WHERE date < $1 AND cancelled = 0
                ORDER BY date DESC, time DESC
            "#;

            let rows = sqlx::query(query)
                .bind(format_date(today))
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_active_for_day(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Appointment>, DbError> {
        Box::pin(async move {
            let query = r#"
                SELECT * FROM appointments
                WHERE provider_id = $1 AND date = $2 AND cancelled = 0
                ORDER BY time ASC
            "#;

            let rows = sqlx::query(query)
                .bind(provider_id.to_string())
                .bind(format_date(date))
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
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
            let query = r#"
                SELECT * FROM appointments
                WHERE provider_id = $1 AND date = $2 AND time = $3 AND cancelled = 0
            "#;

            let rows = sqlx::query(query)
                .bind(provider_id.to_string())
                .bind(format_date(date))
                .bind(time)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            let occupants = rows.iter().map(map_row).collect::<Result<Vec<_>, _>>()?;
            Ok(occupants
                .into_iter()
                .find(|a| exclude.map_or(true, |id| a.id != id)))
        })
    }

    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, DbError> {
        Box::pin(async move {
            debug!("Updating appointment {}", appointment.id);

            let query = r#"
                UPDATE appointments
                SET date = $1, time = $2, kind = $3, reason = $4,
                    confirmed = $5, cancelled = $6,
                    google_event_id = $7, google_meet_link = $8,
                    updated_at = $9
                WHERE id = $10
            "#;

            let result = sqlx::query(query)
                .bind(format_date(appointment.date))
                .bind(&appointment.time)
                .bind(appointment.kind.as_str())
                .bind(&appointment.reason)
                .bind(i64::from(appointment.confirmed))
                .bind(i64::from(appointment.cancelled))
                .bind(&appointment.google_event_id)
                .bind(&appointment.google_meet_link)
                .bind(appointment.updated_at.to_rfc3339())
                .bind(appointment.id.to_string())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to update appointment {}: {}", appointment.id, e);
                    DbError::from_sqlx(e)
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::QueryError(format!(
                    "appointment {} not found",
                    appointment.id
                )));
            }

            Ok(appointment)
        })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, DbError> {
        Box::pin(async move {
            debug!("Deleting appointment {}", id);

            let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
                .bind(id.to_string())
                .execute(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            Ok(result.rows_affected() > 0)
        })
    }
}
