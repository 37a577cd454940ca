//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Customers only
//! ever see their own notifications; admins see everything and can resend,
//! inspect delivery stats and send test messages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use orta_core::analytics::success_rate;
use orta_core::channels::{
    is_valid_channel, is_valid_status, CHANNEL_WHATSAPP, STATUS_SENT,
};
use orta_core::error::CoreError;
use orta_core::messages::test_title;
use orta_core::types::DbId;
use orta_db::models::notification::{
    CreateNotification, Notification, NotificationFilter, NotificationStats,
};
use orta_db::repositories::{NotificationRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub status: Option<String>,
    /// If `true`, return only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkManyRead {
    pub ids: Vec<DbId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResendRequest {
    /// Required to resend a notification that was already delivered.
    #[serde(default)]
    pub force_resend: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendTestRequest {
    pub user_id: DbId,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeliveryResult {
    pub sent: bool,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counts: NotificationStats,
    /// Percentage of all notifications that were delivered.
    pub success_rate: f64,
}

fn notification_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Notification",
        id,
    })
}

/// `None` for admins, the caller's id otherwise.
fn owner_scope(auth: &AuthUser) -> Option<DbId> {
    (!auth.is_admin()).then_some(auth.user_id)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<Notification>>> {
    if let Some(kind) = params.notification_type.as_deref() {
        if !is_valid_channel(kind) {
            return Err(AppError::BadRequest(format!("Tipo de notificación no válido: '{kind}'")));
        }
    }
    if let Some(status) = params.status.as_deref() {
        if !is_valid_status(status) {
            return Err(AppError::BadRequest(format!("Estado no válido: '{status}'")));
        }
    }

    let filter = NotificationFilter {
        user_id: owner_scope(&auth),
        notification_type: params.notification_type,
        status: params.status,
        unread_only: params.unread_only,
    };
    let notifications =
        NotificationRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(ListResponse::new(notifications)))
}

/// GET /api/v1/notifications/{id}
///
/// Notifications owned by someone else look the same as missing ones.
pub async fn get_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let notification = NotificationRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|n| auth.is_admin() || n.user_id == Some(auth.user_id))
        .ok_or_else(|| notification_not_found(id))?;
    Ok(Json(DataResponse { data: notification }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "data": { "unread_count": count } })))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let visible = NotificationRepo::find_by_id(&state.pool, id)
        .await?
        .is_some_and(|n| auth.is_admin() || n.user_id == Some(auth.user_id));
    if !visible {
        return Err(notification_not_found(id));
    }

    // Already-read notifications are left as they are.
    NotificationRepo::mark_read(&state.pool, id, owner_scope(&auth)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read
pub async fn mark_many_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MarkManyRead>,
) -> AppResult<Json<serde_json::Value>> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("Se requiere al menos un id".into()));
    }
    let updated =
        NotificationRepo::mark_many_read(&state.pool, &input.ids, owner_scope(&auth)).await?;
    Ok(Json(json!({ "data": { "updated_count": updated } })))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/{id}/resend
pub async fn resend(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResendRequest>,
) -> AppResult<Json<DataResponse<DeliveryResult>>> {
    let notification = NotificationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| notification_not_found(id))?;

    if notification.status == STATUS_SENT && !input.force_resend {
        return Err(AppError::BadRequest(
            "La notificación ya fue enviada; use force_resend para reenviarla".into(),
        ));
    }

    NotificationRepo::reset_pending(&state.pool, id).await?;
    let sent = state.dispatcher.send_notification(id).await?;
    let notification = NotificationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| notification_not_found(id))?;

    tracing::info!(notification_id = id, admin_id = admin.user_id, sent, "Notification resent");
    Ok(Json(DataResponse {
        data: DeliveryResult { sent, notification },
    }))
}

/// GET /api/v1/notifications/stats
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StatsResponse>>> {
    let counts = NotificationRepo::stats(&state.pool).await?;
    let success_rate = success_rate(counts.sent, counts.total);
    Ok(Json(DataResponse {
        data: StatsResponse {
            counts,
            success_rate,
        },
    }))
}

/// POST /api/v1/notifications/send-test
///
/// The recipient is taken from the target user's account: the email for
/// email and internal messages, the phone for WhatsApp.
pub async fn send_test(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<SendTestRequest>,
) -> AppResult<impl IntoResponse> {
    if !is_valid_channel(&input.notification_type) {
        return Err(AppError::BadRequest(format!(
            "Tipo de notificación no válido: '{}'",
            input.notification_type
        )));
    }
    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let recipient = match input.notification_type.as_str() {
        CHANNEL_WHATSAPP => user.phone.clone().ok_or_else(|| {
            AppError::BadRequest("El usuario no tiene teléfono registrado".into())
        })?,
        _ => user.email.clone(),
    };

    let notification = NotificationRepo::create(
        &state.pool,
        &CreateNotification {
            user_id: Some(user.id),
            recipient,
            title: test_title(&input.title),
            message: input.message,
            notification_type: input.notification_type,
            ..Default::default()
        },
    )
    .await?;

    let sent = state.dispatcher.send_notification(notification.id).await?;
    let notification = NotificationRepo::find_by_id(&state.pool, notification.id)
        .await?
        .unwrap_or(notification);

    tracing::info!(
        notification_id = notification.id,
        admin_id = admin.user_id,
        sent,
        "Test notification sent"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DeliveryResult { sent, notification },
        }),
    ))
}
