//! Provider and user directory endpoints.
//!
//! Thin CRUD surface over the directory repositories. Providers are
//! soft-deactivated rather than deleted so historical bookings keep a valid
//! relation.

use crate::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use clinibook_common::models::{Provider, ProviderStatus, User};
use clinibook_common::{BookingError, HttpStatusCode};
use clinibook_db::{DbError, NewProvider, NewUser};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

fn error_response(err: BookingError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

fn db_error_response(err: DbError) -> (StatusCode, String) {
    error_response(err.into())
}

#[derive(Deserialize, Debug)]
pub struct CreateProviderInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub calendar_id: String,
    pub key_path: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateProviderInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub calendar_id: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[axum::debug_handler]
async fn create_provider_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateProviderInput>,
) -> Result<(StatusCode, Json<Provider>), (StatusCode, String)> {
    let created = state
        .providers
        .insert(NewProvider {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            specialty: input.specialty,
            description: input.description,
            calendar_id: input.calendar_id,
            key_path: input.key_path,
        })
        .await
        .map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
async fn list_providers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Provider>>, (StatusCode, String)> {
    state
        .providers
        .find_active()
        .await
        .map(Json)
        .map_err(db_error_response)
}

#[axum::debug_handler]
async fn get_provider_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Provider>, (StatusCode, String)> {
    state
        .providers
        .find_by_id(id)
        .await
        .map_err(db_error_response)?
        .map(Json)
        .ok_or_else(|| {
            error_response(clinibook_common::not_found(&format!(
                "Provider with ID {id} not found"
            )))
        })
}

#[axum::debug_handler]
async fn update_provider_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProviderInput>,
) -> Result<Json<Provider>, (StatusCode, String)> {
    let mut provider = state
        .providers
        .find_by_id(id)
        .await
        .map_err(db_error_response)?
        .ok_or_else(|| {
            error_response(clinibook_common::not_found(&format!(
                "Provider with ID {id} not found"
            )))
        })?;

    if let Some(first_name) = input.first_name {
        provider.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        provider.last_name = last_name;
    }
    if let Some(email) = input.email {
        provider.email = email;
    }
    if let Some(phone) = input.phone {
        provider.phone = Some(phone);
    }
    if let Some(specialty) = input.specialty {
        provider.specialty = Some(specialty);
    }
    if let Some(description) = input.description {
        provider.description = Some(description);
    }
    if let Some(calendar_id) = input.calendar_id {
        provider.calendar_id = calendar_id;
    }
    if let Some(key_path) = input.key_path {
        provider.key_path = Some(key_path);
    }
    provider.updated_at = Utc::now();

    state
        .providers
        .update(provider)
        .await
        .map(Json)
        .map_err(db_error_response)
}

#[axum::debug_handler]
async fn deactivate_provider_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Provider>, (StatusCode, String)> {
    state
        .providers
        .set_status(id, ProviderStatus::Inactive)
        .await
        .map(Json)
        .map_err(db_error_response)
}

#[axum::debug_handler]
async fn activate_provider_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Provider>, (StatusCode, String)> {
    state
        .providers
        .set_status(id, ProviderStatus::Active)
        .await
        .map(Json)
        .map_err(db_error_response)
}

#[axum::debug_handler]
async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), (StatusCode, String)> {
    let created = state
        .users
        .insert(NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
        })
        .await
        .map_err(db_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, (StatusCode, String)> {
    state
        .users
        .find_all()
        .await
        .map(Json)
        .map_err(db_error_response)
}

#[axum::debug_handler]
async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, (StatusCode, String)> {
    state
        .users
        .find_by_id(id)
        .await
        .map_err(db_error_response)?
        .map(Json)
        .ok_or_else(|| {
            error_response(clinibook_common::not_found(&format!(
                "User with ID {id} not found"
            )))
        })
}

#[axum::debug_handler]
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match &state.db_client {
        Some(client) if client.is_healthy().await => "up",
        Some(_) => "down",
        None => "in-memory",
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

/// Directory and health routes.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/providers", post(create_provider_handler))
        .route("/providers", get(list_providers_handler))
        .route("/providers/{id}", get(get_provider_handler))
        .route(
            "/providers/{id}",
            axum::routing::patch(update_provider_handler),
        )
        .route(
            "/providers/{id}/deactivate",
            post(deactivate_provider_handler),
        )
        .route("/providers/{id}/activate", post(activate_provider_handler))
        .route("/users", post(create_user_handler))
        .route("/users", get(list_users_handler))
        .route("/users/{id}", get(get_user_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
