//! Repository for the `reminder_schedules` table.

use orta_core::appointment::STATUS_CANCELLED;
use orta_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::reminder::{CreateReminder, DueReminder, ReminderFilter, ReminderSchedule};

const COLUMNS: &str = "id, appointment_id, reminder_type, hours_before, scheduled_time, \
                       is_sent, sent_at, created_at";

/// Columns for [`DueReminder`], joined with `appointments a`.
const DUE_COLUMNS: &str = "r.id, r.appointment_id, r.reminder_type, r.hours_before, \
                           r.scheduled_time, a.name, a.email, a.phone, a.date, a.time, a.status";

pub struct ReminderRepo;

impl ReminderRepo {
    /// Insert a reminder unless the same `(appointment, type, hours_before)`
    /// already exists. Returns `None` for duplicates.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateReminder,
    ) -> Result<Option<ReminderSchedule>, sqlx::Error> {
        let query = format!(
            "INSERT INTO reminder_schedules (appointment_id, reminder_type, hours_before, scheduled_time)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (appointment_id, reminder_type, hours_before) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReminderSchedule>(&query)
            .bind(input.appointment_id)
            .bind(&input.reminder_type)
            .bind(input.hours_before)
            .bind(input.scheduled_time)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReminderSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reminder_schedules WHERE id = $1");
        sqlx::query_as::<_, ReminderSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reminders ordered by scheduled time.
    pub async fn list(
        pool: &PgPool,
        filter: &ReminderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReminderSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reminder_schedules
             WHERE ($1 = false OR is_sent = false)
               AND ($2::TEXT IS NULL OR reminder_type = $2)
             ORDER BY scheduled_time, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ReminderSchedule>(&query)
            .bind(filter.pending_only)
            .bind(&filter.reminder_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_appointment(
        pool: &PgPool,
        appointment_id: DbId,
    ) -> Result<Vec<ReminderSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reminder_schedules
             WHERE appointment_id = $1
             ORDER BY scheduled_time, id"
        );
        sqlx::query_as::<_, ReminderSchedule>(&query)
            .bind(appointment_id)
            .fetch_all(pool)
            .await
    }

    /// Unsent reminders scheduled within `[from, to]` for appointments
    /// that have not been cancelled.
    pub async fn list_due(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<DueReminder>, sqlx::Error> {
        let query = format!(
            "SELECT {DUE_COLUMNS}
             FROM reminder_schedules r
             JOIN appointments a ON a.id = r.appointment_id
             WHERE r.is_sent = false
               AND r.scheduled_time BETWEEN $1 AND $2
               AND a.status <> $3
             ORDER BY r.scheduled_time, r.id"
        );
        sqlx::query_as::<_, DueReminder>(&query)
            .bind(from)
            .bind(to)
            .bind(STATUS_CANCELLED)
            .fetch_all(pool)
            .await
    }

    /// Unsent reminders scheduled between `now` and `until`.
    pub async fn upcoming(
        pool: &PgPool,
        now: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<ReminderSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reminder_schedules
             WHERE is_sent = false AND scheduled_time BETWEEN $1 AND $2
             ORDER BY scheduled_time, id"
        );
        sqlx::query_as::<_, ReminderSchedule>(&query)
            .bind(now)
            .bind(until)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reminder_schedules SET is_sent = true, sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Drop reminders not yet sent for an appointment (reschedule or cancel).
    pub async fn delete_unsent_for_appointment(
        pool: &PgPool,
        appointment_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM reminder_schedules WHERE appointment_id = $1 AND is_sent = false",
        )
        .bind(appointment_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Purge sent reminders older than `before`.
    pub async fn delete_sent_before(pool: &PgPool, before: Timestamp) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM reminder_schedules WHERE is_sent = true AND sent_at < $1")
                .bind(before)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
