//! Provider record store
//!
//! Providers are soft-deactivated, never hard-deleted, so historical
//! appointments keep a valid relation.

use crate::error::DbError;
use clinibook_common::models::{Provider, ProviderStatus};
use clinibook_common::services::BoxFuture;
use uuid::Uuid;

/// The fields the caller supplies when registering a provider.
#[derive(Debug, Clone)]
pub struct NewProvider {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub calendar_id: String,
    pub key_path: Option<String>,
}

/// Storage contract for provider records.
pub trait ProviderRepository: Send + Sync {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new provider. `email` and `calendar_id` are unique;
    /// duplicates fail with `DbError::UniqueViolation`.
    fn insert(&self, provider: NewProvider) -> BoxFuture<'_, Provider, DbError>;

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<Provider>, DbError>;

    fn find_by_email(&self, email: &str) -> BoxFuture<'_, Option<Provider>, DbError>;

    /// Active providers ordered by first name.
    fn find_active(&self) -> BoxFuture<'_, Vec<Provider>, DbError>;

    /// All providers including deactivated ones.
    fn find_all(&self) -> BoxFuture<'_, Vec<Provider>, DbError>;

    fn update(&self, provider: Provider) -> BoxFuture<'_, Provider, DbError>;

    /// Flip the lifecycle state; returns the updated record.
    fn set_status(&self, id: Uuid, status: ProviderStatus)
        -> BoxFuture<'_, Provider, DbError>;
}
