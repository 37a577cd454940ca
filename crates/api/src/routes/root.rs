//! Root-level routes: API description, health, monitoring and metrics.
//!
//! Mounted at the top of the router, NOT under `/api/v1`.

use axum::routing::get;
use axum::Router;

use crate::handlers::root;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root::api_info))
        .route("/health", get(root::health))
        .route("/api/health", get(root::health))
        .route("/api/monitoring", get(root::monitoring))
        .route("/api/metrics", get(root::metrics))
}
