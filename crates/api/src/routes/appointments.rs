//! Route definitions for the `/appointments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`.
///
/// ```text
/// POST   /                 -> create_appointment (public, rate-limited)
/// GET    /                 -> list_appointments
/// GET    /business-hours   -> business_hours (public)
/// GET    /available-slots  -> available_slots (public)
/// GET    /{id}             -> get_appointment
/// PUT    /{id}             -> update_appointment
/// DELETE /{id}             -> delete_appointment (admin)
/// POST   /{id}/confirm     -> confirm_appointment (admin)
/// POST   /{id}/cancel      -> cancel_appointment (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/business-hours", get(appointments::business_hours))
        .route("/available-slots", get(appointments::available_slots))
        .route(
            "/{id}",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/{id}/confirm", post(appointments::confirm_appointment))
        .route("/{id}/cancel", post(appointments::cancel_appointment))
}
