//! Repository for the `dresses` table.

use orta_core::types::DbId;
use sqlx::PgPool;

use crate::models::dress::{CreateDress, Dress, UpdateDress};

const COLUMNS: &str =
    "id, name, description, image_url, style, available, created_at, updated_at";

pub struct DressRepo;

impl DressRepo {
    pub async fn create(pool: &PgPool, input: &CreateDress) -> Result<Dress, sqlx::Error> {
        let query = format!(
            "INSERT INTO dresses (name, description, image_url, style, available)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dress>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.style)
            .bind(input.available)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dresses WHERE id = $1");
        sqlx::query_as::<_, Dress>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List dresses, newest first. `style` matches case-insensitively.
    pub async fn list(
        pool: &PgPool,
        available_only: bool,
        style: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dresses
             WHERE ($1 = false OR available = true)
               AND ($2::TEXT IS NULL OR LOWER(style) = LOWER($2))
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Dress>(&query)
            .bind(available_only)
            .bind(style)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every available dress, for the sitemap and structured data.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<Dress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dresses WHERE available = true ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Dress>(&query).fetch_all(pool).await
    }

    pub async fn count_available(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM dresses WHERE available = true")
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDress,
    ) -> Result<Option<Dress>, sqlx::Error> {
        let query = format!(
            "UPDATE dresses SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                style = COALESCE($5, style),
                available = COALESCE($6, available)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dress>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.style)
            .bind(input.available)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dresses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
