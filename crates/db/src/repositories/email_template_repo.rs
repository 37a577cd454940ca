//! Repository for the `email_templates` table.

use orta_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_template::{CreateEmailTemplate, EmailTemplate, UpdateEmailTemplate};

const COLUMNS: &str =
    "id, name, subject, html_content, text_content, is_active, created_at, updated_at";

pub struct EmailTemplateRepo;

impl EmailTemplateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmailTemplate,
    ) -> Result<EmailTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_templates (name, subject, html_content, text_content, is_active)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(&input.name)
            .bind(&input.subject)
            .bind(&input.html_content)
            .bind(&input.text_content)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_templates WHERE id = $1");
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up an active template by its unique name.
    pub async fn find_active_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM email_templates WHERE name = $1 AND is_active = true");
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<EmailTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_templates
             WHERE ($1 = false OR is_active = true)
             ORDER BY name"
        );
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmailTemplate,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE email_templates SET
                name = COALESCE($2, name),
                subject = COALESCE($3, subject),
                html_content = COALESCE($4, html_content),
                text_content = COALESCE($5, text_content),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.subject)
            .bind(&input.html_content)
            .bind(&input.text_content)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
