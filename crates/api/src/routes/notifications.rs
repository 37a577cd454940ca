//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /               -> list_notifications
/// POST   /read           -> mark_many_read
/// GET    /unread-count   -> unread_count
/// GET    /stats          -> stats (admin)
/// POST   /send-test      -> send_test (admin)
/// GET    /{id}           -> get_notification
/// POST   /{id}/read      -> mark_read
/// POST   /{id}/resend    -> resend (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/read", post(notifications::mark_many_read))
        .route("/unread-count", get(notifications::unread_count))
        .route("/stats", get(notifications::stats))
        .route("/send-test", post(notifications::send_test))
        .route("/{id}", get(notifications::get_notification))
        .route("/{id}/read", post(notifications::mark_read))
        .route("/{id}/resend", post(notifications::resend))
}
