//! Patient record store
//!
//! The scheduling core only needs lookup-by-id; create/list exist for the
//! thin API layer.

use crate::error::DbError;
use clinibook_common::models::User;
use clinibook_common::services::BoxFuture;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Storage contract for patient records.
pub trait UserRepository: Send + Sync {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new user. `email` is unique.
    fn insert(&self, user: NewUser) -> BoxFuture<'_, User, DbError>;

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Option<User>, DbError>;

    fn find_all(&self) -> BoxFuture<'_, Vec<User>, DbError>;
}
