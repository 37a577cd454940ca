pub mod analytics;
pub mod appointments;
pub mod auth;
pub mod dresses;
pub mod email_templates;
pub mod notifications;
pub mod reminders;
pub mod root;
pub mod seo;
pub mod testimonials;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth             register, login, refresh, logout, me
/// /users            account management (admin), own profile
/// /appointments     booking (public), back office, opening hours
/// /dresses          catalog (public reads)
/// /testimonials     reviews (public reads)
/// /notifications    inbox, delivery admin
/// /email-templates  template CRUD (admin)
/// /reminders        reminder schedule views
/// /analytics        tracking (public), reports (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/appointments", appointments::router())
        .nest("/dresses", dresses::router())
        .nest("/testimonials", testimonials::router())
        .nest("/notifications", notifications::router())
        .nest("/email-templates", email_templates::router())
        .nest("/reminders", reminders::router())
        .nest("/analytics", analytics::router())
}
