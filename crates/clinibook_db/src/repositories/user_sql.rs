//! SQL implementation of the patient record store

use crate::error::DbError;
use crate::repositories::user::{NewUser, UserRepository};
use crate::DbClient;
use chrono::Utc;
use clinibook_common::models::User;
use clinibook_common::services::BoxFuture;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the user repository
#[derive(Debug, Clone)]
pub struct SqlUserRepository {
    db_client: DbClient,
}

impl SqlUserRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_row(row: &AnyRow) -> Result<User, DbError> {
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

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| DbError::DecodeError(format!("bad uuid '{id}': {e}")))?,
        first_name,
        last_name,
        email,
        phone,
    })
}

impl UserRepository for SqlUserRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        Box::pin(async move {
            debug!("Initializing user schema");

            let table = r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    phone TEXT,
                    created_at TEXT NOT NULL
                )
            "#;
            self.db_client.execute(table).await?;

            info!("User schema initialized successfully");
            Ok(())
        })
    }

    fn insert(&self, user: NewUser) -> BoxFuture<'_, User, DbError> {
        Box::pin(async move {
            debug!("Inserting user {}", user.email);

            let record = User {
                id: Uuid::new_v4(),
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone: user.phone,
            };

            let query = r#"
                INSERT INTO users (id, first_name, last_name, email, phone, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#;

            sqlx::query(query)
                .bind(record.id.to_string())
                .bind(&record.first_name)
                .bind(&record.last_name)
                .bind(&record.email)
                .bind(&record.phone)
                .bind(Utc::now().to_rfc3339())
                .execute(self.db_client.pool())
                .await
                .map_err(|e| {
                    error!("Failed to insert user: {}", e);
                    DbError::from_sqlx(e)
                })?;

            info!("User {} created", record.id);
            Ok(record)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<User>, DbError> {
        Box::pin(async move {
            let row = sqlx::query("SELECT * FROM users WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            row.as_ref().map(map_row).transpose()
        })
    }

    fn find_all(&self) -> BoxFuture<'_, Vec<User>, DbError> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT * FROM users ORDER BY last_name ASC, first_name ASC")
                .fetch_all(self.db_client.pool())
                .await
                .map_err(DbError::from_sqlx)?;

            rows.iter().map(map_row).collect()
        })
    }
}
