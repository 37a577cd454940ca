//! Reusable email template model and DTOs.

use orta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `email_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailTemplate {
    pub id: DbId,
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmailTemplate {
    pub name: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEmailTemplate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    pub text_content: Option<String>,
    pub is_active: Option<bool>,
}
