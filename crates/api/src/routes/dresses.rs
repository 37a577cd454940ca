//! Route definitions for the `/dresses` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::dresses;
use crate::state::AppState;

/// Routes mounted at `/dresses`. Reads are public; writes need an admin.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dresses::list_dresses).post(dresses::create_dress))
        .route(
            "/{id}",
            get(dresses::get_dress)
                .put(dresses::update_dress)
                .delete(dresses::delete_dress),
        )
}
