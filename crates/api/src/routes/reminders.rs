//! Route definitions for the `/reminders` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reminders;
use crate::state::AppState;

/// Routes mounted at `/reminders`.
///
/// ```text
/// GET /           -> list_reminders
/// GET /upcoming   -> upcoming (admin)
/// GET /{id}       -> get_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reminders::list_reminders))
        .route("/upcoming", get(reminders::upcoming))
        .route("/{id}", get(reminders::get_reminder))
}
