//! Outbound notification model and DTOs.

use orta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// `recipient` is the email address or phone number the message goes to.
/// Notifications created for a booking have no `user_id`; they are tied to
/// the appointment instead.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub appointment_id: Option<DbId>,
    pub recipient: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub status: String,
    pub sent_at: Option<Timestamp>,
    pub read_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub email_data: serde_json::Value,
    pub whatsapp_data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Notification {
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNotification {
    pub user_id: Option<DbId>,
    pub appointment_id: Option<DbId>,
    pub recipient: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub max_retries: Option<i32>,
    pub email_data: Option<serde_json::Value>,
    pub whatsapp_data: Option<serde_json::Value>,
}

/// Filters for listing notifications. `user_id` scopes to one owner.
#[derive(Debug, Default)]
pub struct NotificationFilter {
    pub user_id: Option<DbId>,
    pub notification_type: Option<String>,
    pub status: Option<String>,
    pub unread_only: bool,
}

/// Aggregate counters for the back-office dashboard.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct NotificationStats {
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub pending: i64,
    pub read: i64,
    pub unread: i64,
    pub email: i64,
    pub whatsapp: i64,
    pub internal: i64,
}
