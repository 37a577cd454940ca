//! Read-only views over scheduled appointment reminders.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use orta_core::channels::{CHANNEL_EMAIL, CHANNEL_WHATSAPP};
use orta_core::error::CoreError;
use orta_core::reminders::UPCOMING_WINDOW_HOURS;
use orta_core::types::DbId;
use orta_db::models::reminder::{ReminderFilter, ReminderSchedule};
use orta_db::repositories::ReminderRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub pending_only: bool,
    #[serde(rename = "type")]
    pub reminder_type: Option<String>,
}

/// GET /api/v1/reminders
pub async fn list_reminders(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReminderQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<ReminderSchedule>>> {
    if let Some(kind) = query.reminder_type.as_deref() {
        if kind != CHANNEL_EMAIL && kind != CHANNEL_WHATSAPP {
            return Err(AppError::BadRequest(format!(
                "Tipo de recordatorio no válido: '{kind}'"
            )));
        }
    }
    let filter = ReminderFilter {
        pending_only: query.pending_only,
        reminder_type: query.reminder_type,
    };
    let reminders = ReminderRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(ListResponse::new(reminders)))
}

/// GET /api/v1/reminders/{id}
pub async fn get_reminder(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReminderSchedule>>> {
    let reminder = ReminderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reminder",
            id,
        }))?;
    Ok(Json(DataResponse { data: reminder }))
}

/// GET /api/v1/reminders/upcoming
///
/// Unsent reminders due within the next two hours.
pub async fn upcoming(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<ReminderSchedule>>> {
    let now = Utc::now();
    let reminders =
        ReminderRepo::upcoming(&state.pool, now, now + Duration::hours(UPCOMING_WINDOW_HOURS))
            .await?;
    Ok(Json(ListResponse::new(reminders)))
}
