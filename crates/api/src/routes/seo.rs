//! Public SEO documents.

use axum::routing::get;
use axum::Router;

use crate::handlers::seo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
        .route("/structured-data/{page}", get(seo::structured_data))
}
