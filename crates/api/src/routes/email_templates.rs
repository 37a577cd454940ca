//! Route definitions for the `/email-templates` resource (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::email_templates;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(email_templates::list_templates).post(email_templates::create_template),
        )
        .route(
            "/{id}",
            get(email_templates::get_template)
                .put(email_templates::update_template)
                .delete(email_templates::delete_template),
        )
}
