//! Axum handlers for the booking API.

use crate::dto::{AppointmentView, CreateAppointmentInput, UpdateAppointmentInput};
use crate::service::AppointmentService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use clinibook_common::models::Appointment;
use clinibook_common::{BookingError, HttpStatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for the booking handlers.
#[derive(Clone)]
pub struct SchedulingState {
    pub service: Arc<AppointmentService>,
}

fn error_response(err: BookingError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

async fn into_view(
    state: &SchedulingState,
    appointment: Appointment,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    state
        .service
        .view(appointment)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn into_views(
    state: &SchedulingState,
    appointments: Vec<Appointment>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    state
        .service
        .views(appointments)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize, Debug)]
pub struct SlotsQuery {
    /// Day to compute availability for, `YYYY-MM-DD`.
    pub date: NaiveDate,
}

#[derive(Serialize, Debug)]
pub struct AvailableSlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

#[axum::debug_handler]
pub async fn create_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(input): Json<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<AppointmentView>), (StatusCode, String)> {
    let appointment = state.service.create(input).await.map_err(error_response)?;
    let view = into_view(&state, appointment).await?;
    Ok((StatusCode::CREATED, view))
}

#[axum::debug_handler]
pub async fn list_appointments_handler(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    let appointments = state.service.list_all().await.map_err(error_response)?;
    into_views(&state, appointments).await
}

#[axum::debug_handler]
pub async fn list_upcoming_handler(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    let appointments = state.service.list_upcoming().await.map_err(error_response)?;
    into_views(&state, appointments).await
}

#[axum::debug_handler]
pub async fn list_past_handler(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    let appointments = state.service.list_past().await.map_err(error_response)?;
    into_views(&state, appointments).await
}

#[axum::debug_handler]
pub async fn get_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    let appointment = state.service.get(id).await.map_err(error_response)?;
    into_view(&state, appointment).await
}

#[axum::debug_handler]
pub async fn update_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAppointmentInput>,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    let appointment = state
        .service
        .update(id, input)
        .await
        .map_err(error_response)?;
    into_view(&state, appointment).await
}

#[axum::debug_handler]
pub async fn confirm_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    let appointment = state.service.confirm(id).await.map_err(error_response)?;
    into_view(&state, appointment).await
}

#[axum::debug_handler]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    let appointment = state.service.cancel(id).await.map_err(error_response)?;
    into_view(&state, appointment).await
}

#[axum::debug_handler]
pub async fn delete_appointment_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentView>, (StatusCode, String)> {
    let appointment = state.service.remove(id).await.map_err(error_response)?;
    into_view(&state, appointment).await
}

#[axum::debug_handler]
pub async fn list_user_appointments_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    let appointments = state
        .service
        .list_by_user(user_id)
        .await
        .map_err(error_response)?;
    into_views(&state, appointments).await
}

#[axum::debug_handler]
pub async fn list_provider_appointments_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<AppointmentView>>, (StatusCode, String)> {
    let appointments = state
        .service
        .list_by_provider(provider_id)
        .await
        .map_err(error_response)?;
    into_views(&state, appointments).await
}

#[axum::debug_handler]
pub async fn provider_slots_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, (StatusCode, String)> {
    let slots = state
        .service
        .available_slots(provider_id, query.date)
        .await
        .map_err(error_response)?;

    Ok(Json(AvailableSlotsResponse {
        date: query.date,
        slots,
    }))
}
