//! Route table for the booking API.

use crate::handlers::{
    cancel_appointment_handler, confirm_appointment_handler, create_appointment_handler,
    delete_appointment_handler, get_appointment_handler, list_appointments_handler,
    list_past_handler, list_provider_appointments_handler, list_upcoming_handler,
    list_user_appointments_handler, provider_slots_handler, update_appointment_handler,
    SchedulingState,
};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all booking routes. Static segments are
/// registered before the `{id}` capture so `upcoming` and `past` are not
/// swallowed by it.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/appointments", post(create_appointment_handler))
        .route("/appointments", get(list_appointments_handler))
        .route("/appointments/upcoming", get(list_upcoming_handler))
        .route("/appointments/past", get(list_past_handler))
        .route("/appointments/{id}", get(get_appointment_handler))
        .route("/appointments/{id}", patch(update_appointment_handler))
        .route(
            "/appointments/{id}/confirm",
            post(confirm_appointment_handler),
        )
        .route(
            "/appointments/{id}/cancel",
            post(cancel_appointment_handler),
        )
        .route("/appointments/{id}", delete(delete_appointment_handler))
        .route(
            "/users/{user_id}/appointments",
            get(list_user_appointments_handler),
        )
        .route(
            "/providers/{provider_id}/appointments",
            get(list_provider_appointments_handler),
        )
        .route(
            "/providers/{provider_id}/slots",
            get(provider_slots_handler),
        )
        .with_state(state)
}
