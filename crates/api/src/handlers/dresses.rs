//! Handlers for the `/dresses` catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use orta_core::error::CoreError;
use orta_core::types::DbId;
use orta_core::validation::{sanitize_text, MAX_TEXT_LENGTH};
use orta_db::models::dress::{CreateDress, Dress, UpdateDress};
use orta_db::repositories::DressRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DressQuery {
    #[serde(default)]
    pub available_only: bool,
    pub style: Option<String>,
}

fn dress_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Dress", id })
}

/// Sanitize a required text field, rejecting blank input.
pub(crate) fn required_text(field: &str, raw: &str) -> AppResult<String> {
    let clean = sanitize_text(raw.trim(), MAX_TEXT_LENGTH);
    if clean.is_empty() {
        return Err(AppError::BadRequest(format!("El campo '{field}' es obligatorio")));
    }
    Ok(clean)
}

/// GET /api/v1/dresses
pub async fn list_dresses(
    State(state): State<AppState>,
    Query(filter): Query<DressQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<Dress>>> {
    let style = filter
        .style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let dresses = DressRepo::list(
        &state.pool,
        filter.available_only,
        style,
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(ListResponse::new(dresses)))
}

/// GET /api/v1/dresses/{id}
pub async fn get_dress(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Dress>>> {
    let dress = DressRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| dress_not_found(id))?;
    Ok(Json(DataResponse { data: dress }))
}

/// POST /api/v1/dresses
pub async fn create_dress(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateDress>,
) -> AppResult<impl IntoResponse> {
    input.name = required_text("name", &input.name)?;
    let dress = DressRepo::create(&state.pool, &input).await?;
    tracing::info!(dress_id = dress.id, admin_id = admin.user_id, "Dress created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: dress })))
}

/// PUT /api/v1/dresses/{id}
pub async fn update_dress(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateDress>,
) -> AppResult<Json<DataResponse<Dress>>> {
    if let Some(name) = input.name.as_deref() {
        input.name = Some(required_text("name", name)?);
    }
    let dress = DressRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| dress_not_found(id))?;
    tracing::info!(dress_id = id, admin_id = admin.user_id, "Dress updated");
    Ok(Json(DataResponse { data: dress }))
}

/// DELETE /api/v1/dresses/{id}
pub async fn delete_dress(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !DressRepo::delete(&state.pool, id).await? {
        return Err(dress_not_found(id));
    }
    tracing::info!(dress_id = id, admin_id = admin.user_id, "Dress deleted");
    Ok(StatusCode::NO_CONTENT)
}
