//! Dress catalog model and DTOs.

use orta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dresses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dress {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub style: Option<String>,
    pub available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateDress {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub style: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDress {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub style: Option<String>,
    pub available: Option<bool>,
}
