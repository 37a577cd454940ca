//! Handlers for `/users`: admin account management and self-service profile edits.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use orta_core::error::CoreError;
use orta_core::roles::VALID_ROLES;
use orta_core::types::{Date, DbId};
use orta_core::validation::validate_phone;
use orta_db::models::user::{UpdateUser, UserResponse};
use orta_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub items: Vec<UserResponse>,
    pub total: i64,
}

/// Fields a user may change on their own account.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub wedding_date: Option<Date>,
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn check_phone(phone: Option<&str>) -> AppResult<Option<String>> {
    match phone.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(Some(validate_phone(p)?)),
        _ => Ok(None),
    }
}

/// GET /api/v1/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<UserPage>>> {
    let users = UserRepo::list(&state.pool, page.limit(), page.offset()).await?;
    let total = UserRepo::count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: UserPage {
            items: users.iter().map(UserResponse::from).collect(),
            total,
        },
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(role) = input.role.as_deref() {
        if !VALID_ROLES.contains(&role) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role '{role}'"
            ))));
        }
    }
    input.phone = check_phone(input.phone.as_deref())?;

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Deactivates the account; rows are kept for appointment history.
pub async fn deactivate_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Administrators cannot deactivate their own account".into(),
        ));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(user_not_found(id));
    }
    tracing::info!(user_id = id, admin_id = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/users/me
pub async fn update_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let update = UpdateUser {
        first_name: input.first_name.map(|s| s.trim().to_string()),
        last_name: input.last_name.map(|s| s.trim().to_string()),
        phone: check_phone(input.phone.as_deref())?,
        birth_date: input.birth_date,
        wedding_date: input.wedding_date,
        ..Default::default()
    };

    let updated = UserRepo::update(&state.pool, user.user_id, &update)
        .await?
        .ok_or_else(|| user_not_found(user.user_id))?;

    tracing::info!(user_id = user.user_id, "Profile updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&updated),
    }))
}
