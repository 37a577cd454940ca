//! Handlers for the `/testimonials` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use orta_core::error::CoreError;
use orta_core::types::DbId;
use orta_db::models::testimonial::{CreateTestimonial, Testimonial, UpdateTestimonial};
use orta_db::repositories::TestimonialRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::dresses::required_text;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

fn testimonial_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Testimonial",
        id,
    })
}

/// GET /api/v1/testimonials
pub async fn list_testimonials(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<Testimonial>>> {
    let testimonials = TestimonialRepo::list(&state.pool, page.limit(), page.offset()).await?;
    Ok(Json(ListResponse::new(testimonials)))
}

/// GET /api/v1/testimonials/{id}
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Testimonial>>> {
    let testimonial = TestimonialRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| testimonial_not_found(id))?;
    Ok(Json(DataResponse { data: testimonial }))
}

/// POST /api/v1/testimonials
pub async fn create_testimonial(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateTestimonial>,
) -> AppResult<impl IntoResponse> {
    input.bride_name = required_text("bride_name", &input.bride_name)?;
    input.testimonial = required_text("testimonial", &input.testimonial)?;
    let testimonial = TestimonialRepo::create(&state.pool, &input).await?;
    tracing::info!(
        testimonial_id = testimonial.id,
        admin_id = admin.user_id,
        "Testimonial created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: testimonial })))
}

/// PUT /api/v1/testimonials/{id}
pub async fn update_testimonial(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateTestimonial>,
) -> AppResult<Json<DataResponse<Testimonial>>> {
    if let Some(name) = input.bride_name.as_deref() {
        input.bride_name = Some(required_text("bride_name", name)?);
    }
    if let Some(text) = input.testimonial.as_deref() {
        input.testimonial = Some(required_text("testimonial", text)?);
    }
    let testimonial = TestimonialRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| testimonial_not_found(id))?;
    tracing::info!(testimonial_id = id, admin_id = admin.user_id, "Testimonial updated");
    Ok(Json(DataResponse { data: testimonial }))
}

/// DELETE /api/v1/testimonials/{id}
pub async fn delete_testimonial(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TestimonialRepo::delete(&state.pool, id).await? {
        return Err(testimonial_not_found(id));
    }
    tracing::info!(testimonial_id = id, admin_id = admin.user_id, "Testimonial deleted");
    Ok(StatusCode::NO_CONTENT)
}
