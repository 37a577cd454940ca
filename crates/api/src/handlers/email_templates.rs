//! Admin CRUD for reusable email templates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use orta_core::error::CoreError;
use orta_core::types::DbId;
use orta_db::models::email_template::{CreateEmailTemplate, EmailTemplate, UpdateEmailTemplate};
use orta_db::repositories::EmailTemplateRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub active_only: bool,
}

fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "EmailTemplate",
        id,
    })
}

fn check_required(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("El campo '{field}' es obligatorio")));
    }
    Ok(())
}

/// GET /api/v1/email-templates
pub async fn list_templates(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> AppResult<Json<ListResponse<EmailTemplate>>> {
    let templates = EmailTemplateRepo::list(&state.pool, query.active_only).await?;
    Ok(Json(ListResponse::new(templates)))
}

/// GET /api/v1/email-templates/{id}
pub async fn get_template(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmailTemplate>>> {
    let template = EmailTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/email-templates
///
/// Template names are unique; a duplicate is a 409.
pub async fn create_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEmailTemplate>,
) -> AppResult<impl IntoResponse> {
    check_required("name", &input.name)?;
    check_required("subject", &input.subject)?;
    check_required("html_content", &input.html_content)?;

    let template = EmailTemplateRepo::create(&state.pool, &input).await?;
    tracing::info!(
        template_id = template.id,
        name = %template.name,
        admin_id = admin.user_id,
        "Email template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /api/v1/email-templates/{id}
pub async fn update_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmailTemplate>,
) -> AppResult<Json<DataResponse<EmailTemplate>>> {
    if let Some(name) = input.name.as_deref() {
        check_required("name", name)?;
    }
    if let Some(subject) = input.subject.as_deref() {
        check_required("subject", subject)?;
    }
    let template = EmailTemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    tracing::info!(template_id = id, admin_id = admin.user_id, "Email template updated");
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/email-templates/{id}
pub async fn delete_template(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EmailTemplateRepo::delete(&state.pool, id).await? {
        return Err(template_not_found(id));
    }
    tracing::info!(template_id = id, admin_id = admin.user_id, "Email template deleted");
    Ok(StatusCode::NO_CONTENT)
}
