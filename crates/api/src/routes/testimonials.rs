//! Route definitions for the `/testimonials` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::testimonials;
use crate::state::AppState;

/// Routes mounted at `/testimonials`. Reads are public; writes need an admin.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route(
            "/{id}",
            get(testimonials::get_testimonial)
                .put(testimonials::update_testimonial)
                .delete(testimonials::delete_testimonial),
        )
}
