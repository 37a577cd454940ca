//! Sitemap, robots.txt and JSON-LD structured data for the public site.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use orta_core::seo::{self, DressEntry, ReviewEntry, MAX_STRUCTURED_ITEMS};
use orta_db::models::dress::Dress;
use orta_db::models::testimonial::Testimonial;
use orta_db::repositories::{DressRepo, TestimonialRepo};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

fn dress_entry(dress: &Dress) -> DressEntry {
    DressEntry {
        id: dress.id,
        name: dress.name.clone(),
        description: dress.description.clone(),
        image_url: dress.image_url.clone(),
        updated_on: Some(dress.updated_at.date_naive()),
    }
}

fn review_entry(testimonial: &Testimonial) -> ReviewEntry {
    ReviewEntry {
        bride_name: testimonial.bride_name.clone(),
        testimonial: testimonial.testimonial.clone(),
        wedding_date: testimonial.wedding_date,
    }
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dresses: Vec<DressEntry> = DressRepo::list_available(&state.pool)
        .await?
        .iter()
        .map(dress_entry)
        .collect();
    let xml = seo::sitemap_xml(&state.config.site_url, Utc::now().date_naive(), &dresses);
    Ok(([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    let txt = seo::robots_txt(&state.config.site_url, Utc::now().date_naive());
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], txt)
}

/// GET /structured-data/{page}
///
/// Pages: `home`, `dresses`, `testimonials`, `appointments`. Unknown pages are 404.
pub async fn structured_data(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> AppResult<Response> {
    if !seo::STRUCTURED_DATA_PAGES.contains(&page.as_str()) {
        return Ok(unknown_page(&page));
    }

    let limit = MAX_STRUCTURED_ITEMS as i64;
    let dresses: Vec<DressEntry> = if page == "dresses" {
        DressRepo::list(&state.pool, true, None, limit, 0)
            .await?
            .iter()
            .map(dress_entry)
            .collect()
    } else {
        Vec::new()
    };
    let reviews: Vec<ReviewEntry> = if page == "testimonials" {
        TestimonialRepo::list(&state.pool, limit, 0)
            .await?
            .iter()
            .map(review_entry)
            .collect()
    } else {
        Vec::new()
    };

    match seo::structured_data(&page, &state.config.site_url, &dresses, &reviews) {
        Some(docs) => Ok(Json(json!({ "page": page, "structured_data": docs })).into_response()),
        None => Ok(unknown_page(&page)),
    }
}

fn unknown_page(page: &str) -> Response {
    tracing::debug!(page, "Structured data requested for unknown page");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": format!("Unknown page '{page}'"),
            "code": "NOT_FOUND",
        })),
    )
        .into_response()
}
