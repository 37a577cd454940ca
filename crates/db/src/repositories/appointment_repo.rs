//! Repository for the `appointments` table.

use orta_core::appointment::STATUS_CANCELLED;
use orta_core::types::{Date, DbId, Time};
use sqlx::PgPool;

use crate::models::appointment::{
    Appointment, AppointmentFilter, CreateAppointment, StatusCount, UpdateAppointment,
};

const COLUMNS: &str = "id, name, phone, email, confirmation_method, date, time, status, \
                       comment, auto_confirmed, created_at, updated_at";

pub struct AppointmentRepo;

impl AppointmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointments (name, phone, email, confirmation_method, date, time, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.confirmation_method)
            .bind(input.date)
            .bind(input.time)
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List appointments, soonest first, with optional status/date filters.
    pub async fn list(
        pool: &PgPool,
        filter: &AppointmentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::DATE IS NULL OR date = $2)
             ORDER BY date, time
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(&filter.status)
            .bind(filter.date)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Times already taken on `date` by appointments that are not cancelled.
    pub async fn booked_times(pool: &PgPool, date: Date) -> Result<Vec<Time>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT time FROM appointments
             WHERE date = $1 AND status <> $2
             ORDER BY time",
        )
        .bind(date)
        .bind(STATUS_CANCELLED)
        .fetch_all(pool)
        .await
    }

    /// Update an appointment. Only non-`None` fields in `input` are applied;
    /// an empty `phone` or `email` clears that column.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET
                name = COALESCE($2, name),
                phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END,
                email = CASE WHEN $4::text IS NULL THEN email ELSE NULLIF($4, '') END,
                confirmation_method = COALESCE($5, confirmation_method),
                date = COALESCE($6, date),
                time = COALESCE($7, time),
                status = COALESCE($8, status),
                comment = COALESCE($9, comment)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.confirmation_method)
            .bind(input.date)
            .bind(input.time)
            .bind(&input.status)
            .bind(&input.comment)
            .fetch_optional(pool)
            .await
    }

    /// Set the status directly, e.g. confirm or cancel.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("UPDATE appointments SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Record that the confirmation message reached the customer.
    pub async fn mark_auto_confirmed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE appointments SET auto_confirmed = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Hard-delete an appointment. Reminders cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM appointments GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
