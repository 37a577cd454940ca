//! Repository for the `notifications` table.

use orta_core::channels::{
    CHANNEL_EMAIL, CHANNEL_INTERNAL, CHANNEL_WHATSAPP, DEFAULT_MAX_RETRIES, STATUS_FAILED,
    STATUS_PENDING, STATUS_READ, STATUS_SENT,
};
use orta_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{
    CreateNotification, Notification, NotificationFilter, NotificationStats,
};

const COLUMNS: &str = "id, user_id, appointment_id, recipient, title, message, \
                       notification_type, status, sent_at, read_at, error_message, \
                       retry_count, max_retries, email_data, whatsapp_data, created_at, updated_at";

/// Provides CRUD and delivery-state operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a pending notification.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (user_id, appointment_id, recipient, title, message, notification_type,
                 max_retries, email_data, whatsapp_data)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, $8),
                     COALESCE($9, '{{}}'::jsonb), COALESCE($10, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(input.appointment_id)
            .bind(&input.recipient)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.notification_type)
            .bind(input.max_retries)
            .bind(DEFAULT_MAX_RETRIES)
            .bind(&input.email_data)
            .bind(&input.whatsapp_data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List notifications, newest first.
    ///
    /// When `unread_only` is set, only notifications without `read_at` are returned.
    pub async fn list(
        pool: &PgPool,
        filter: &NotificationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::TEXT IS NULL OR notification_type = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4 = false OR read_at IS NULL)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(filter.user_id)
            .bind(&filter.notification_type)
            .bind(&filter.status)
            .bind(filter.unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark one notification read. `user_id` restricts the update to its owner.
    ///
    /// Returns `true` if a row changed.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        user_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET status = $3, read_at = NOW()
             WHERE id = $1
               AND ($2::BIGINT IS NULL OR user_id = $2)
               AND read_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .bind(STATUS_READ)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark several notifications read. Returns the number updated.
    pub async fn mark_many_read(
        pool: &PgPool,
        ids: &[DbId],
        user_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET status = $3, read_at = NOW()
             WHERE id = ANY($1)
               AND ($2::BIGINT IS NULL OR user_id = $2)
               AND read_at IS NULL",
        )
        .bind(ids)
        .bind(user_id)
        .bind(STATUS_READ)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Record a successful delivery, merging provider details into the channel data.
    pub async fn mark_sent(
        pool: &PgPool,
        id: DbId,
        provider_data: Option<&serde_json::Value>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications SET
                status = $2,
                sent_at = NOW(),
                error_message = NULL,
                whatsapp_data = CASE WHEN notification_type = 'whatsapp' AND $3::JSONB IS NOT NULL
                                     THEN whatsapp_data || $3 ELSE whatsapp_data END,
                email_data = CASE WHEN notification_type = 'email' AND $3::JSONB IS NOT NULL
                                  THEN email_data || $3 ELSE email_data END
             WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_SENT)
        .bind(provider_data)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed delivery attempt and bump `retry_count`.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications SET
                status = $2,
                error_message = $3,
                retry_count = retry_count + 1
             WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_FAILED)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Put a notification back to pending before a manual resend.
    pub async fn reset_pending(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications SET status = $2, sent_at = NULL, error_message = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(STATUS_PENDING)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Failed notifications that still have retries left, oldest first.
    pub async fn list_retryable(pool: &PgPool, limit: i64) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE status = $1 AND retry_count < max_retries
             ORDER BY created_at
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(STATUS_FAILED)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Counters by status and channel.
    pub async fn stats(pool: &PgPool) -> Result<NotificationStats, sqlx::Error> {
        sqlx::query_as::<_, NotificationStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = $1) AS sent,
                COUNT(*) FILTER (WHERE status = $2) AS failed,
                COUNT(*) FILTER (WHERE status = $3) AS pending,
                COUNT(*) FILTER (WHERE read_at IS NOT NULL) AS read,
                COUNT(*) FILTER (WHERE read_at IS NULL) AS unread,
                COUNT(*) FILTER (WHERE notification_type = $4) AS email,
                COUNT(*) FILTER (WHERE notification_type = $5) AS whatsapp,
                COUNT(*) FILTER (WHERE notification_type = $6) AS internal
             FROM notifications",
        )
        .bind(STATUS_SENT)
        .bind(STATUS_FAILED)
        .bind(STATUS_PENDING)
        .bind(CHANNEL_EMAIL)
        .bind(CHANNEL_WHATSAPP)
        .bind(CHANNEL_INTERNAL)
        .fetch_one(pool)
        .await
    }

    /// Number of notifications per status, for the metrics endpoint.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM notifications GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
