//! Route definitions for the `/analytics` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// POST  /events                         -> track_event (public)
/// GET   /events                         -> list_events (admin)
/// POST  /events/bulk                    -> track_events_bulk (public)
/// POST  /conversions                    -> track_conversion (public)
/// GET   /conversions                    -> list_conversions (admin)
/// POST  /sessions/start                 -> start_session (public)
/// PATCH /sessions/{session_id}/end      -> end_session (public)
/// GET   /reports/dashboard              -> dashboard (admin)
/// GET   /reports/business-insights      -> business_insights (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(analytics::list_events).post(analytics::track_event),
        )
        .route("/events/bulk", post(analytics::track_events_bulk))
        .route(
            "/conversions",
            get(analytics::list_conversions).post(analytics::track_conversion),
        )
        .route("/sessions/start", post(analytics::start_session))
        .route("/sessions/{session_id}/end", patch(analytics::end_session))
        .route("/reports/dashboard", get(analytics::dashboard))
        .route(
            "/reports/business-insights",
            get(analytics::business_insights),
        )
}
