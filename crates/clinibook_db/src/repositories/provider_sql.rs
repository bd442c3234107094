//! SQL implementation of the provider record store

use crate::error::DbError;
use crate::repositories::provider::{NewProvider, ProviderRepository};
use crate::DbClient;
use chrono::{DateTime, Utc};
use clinibook_common::models::{Provider, ProviderStatus};
use clinibook_common::services::BoxFuture;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the provider repository
#[derive(Debug, Clone)]
pub struct SqlProviderRepository {
    db_client: DbClient,
}

impl SqlProviderRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::DecodeError(format!("bad uuid '{value}': {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("bad timestamp '{value}': {e}")))
}

fn map_row(row: &AnyRow) -> Result<Provider, DbError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let first_name: String = row
        .try_get("first_name")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let last_name: String = row
        .try_get("last_name")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let phone: Option<String> = row
        .try_get("phone")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let specialty: Option<String> = row
        .try_get("specialty")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let description: Option<String> = row
        .try_get("description")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let calendar_id: String = row
        .try_get("calendar_id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let key_path: Option<String> = row
        .try_get("key_path")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

    Ok(Provider {
        id: parse_uuid(&id)?,
        first_name,
        last_name,
        email,
        phone,
        specialty,
        description,
        calendar_id,
        key_path,
        status: ProviderStatus::parse(&status)
            .ok_or_else(|| DbError::DecodeError(format!("bad provider status '{status}'")))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

impl ProviderRepository for SqlProviderRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing provider schema");

            let table = r#"
                CREATE TABLE IF NOT EXISTS providers (
                    id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    phone TEXT,
                    specialty TEXT,
                    description TEXT,
                    calendar_id TEXT NOT NULL UNIQUE,
                    key_path TEXT,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(table).await?;

            info!("Provider schema initialized successfully");
            Ok(())
        })
    }

    fn insert(&self, provider: NewProvider) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            debug!("Inserting provider {}", provider.email);

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

            let query = r#"
                INSERT INTO providers
                    (id, first_name, last_name, email, phone, specialty,
                     description, calendar_id, key_path, status,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#;

            sqlx::query(query)
                .bind(record.id.to_string())
                .bind(&record.first_name)
                .bind(&record.last_name)
                .bind(&record.email)
                .bind(&record.phone)
                .bind(&record.specialty)
                .bind(&record.description)
                .bind(&record.calendar_id)
                .bind(&record.key_path)
                .bind(record.status.as_str())
                .bind(record.created_at.to_rfc3339())
                .bind(record.updated_at.to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert provider: {}", e);
                    DbError::from_sqlx(e)
                })?;

            info!("Provider {} created", record.id);
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Provider>, DbError> {
        Box::pin(async move {
            let row = sqlx::query("SELECT * FROM providers WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            row.as_ref().map(map_row).transpose()
        })
    }

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Provider>, DbError> {
        let email = email.to_string();

        Box::pin(async move {
            let row = sqlx::query("SELECT * FROM providers WHERE email = $1")
                .bind(email)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            row.as_ref().map(map_row).transpose()
        })
    }

    fn find_active(&self) -> BoxFuture<'_, Vec<Provider>, DbError> {
        Box::pin(async move {
            let query = "SELECT * FROM providers WHERE status = 'active' ORDER BY first_name ASC";

            let rows = sqlx::query(query)
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<Provider>, DbError> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT * FROM providers ORDER BY first_name ASC")
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }

    fn update(&self, provider: Provider) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            debug!("Updating provider {}", provider.id);

            let query = r#"
                UPDATE providers
                SET first_name = $1, last_name = $2, email = $3, phone = $4,
                    specialty = $5, description = $6, calendar_id = $7,
                    key_path = $8, status = $9, updated_at = $10
                WHERE id = $11
            "#;

            let result = sqlx::query(query)
                .bind(&provider.first_name)
                .bind(&provider.last_name)
                .bind(&provider.email)
                .bind(&provider.phone)
                .bind(&provider.specialty)
                .bind(&provider.description)
                .bind(&provider.calendar_id)
                .bind(&provider.key_path)
                .bind(provider.status.as_str())
                .bind(provider.updated_at.to_rfc3339())
                .bind(provider.id.to_string())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to update provider {}: {}", provider.id, e);
                    DbError::from_sqlx(e)
                })?;

            if result.rows_affected() == 0 {
                return Err(DbError::QueryError(format!(
                    "provider {} not found",
                    provider.id
                )));
            }

            Ok(provider)
        })
    }

    fn set_status(
        &self,
        id: Uuid,
        status: ProviderStatus,
    ) -> BoxFuture<'_, Provider, DbError> {
        Box::pin(async move {
            debug!("Setting provider {} status to {}", id, status.as_str());

            let now = Utc::now();
            let result = sqlx::query("UPDATE providers SET status = $1, updated_at = $2 WHERE id = $3")
                .bind(status.as_str())
                .bind(now.to_rfc3339())
                .bind(id.to_string())
                .execute(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            if result.rows_affected() == 0 {
                return Err(DbError::QueryError(format!("provider {id} not found")));
            }

            let row = sqlx::query("SELECT * FROM providers WHERE id = $1")
                .bind(id.to_string())
                .fetch_one(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            map_row(&row)
        })
    }
}
