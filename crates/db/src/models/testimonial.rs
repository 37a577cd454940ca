//! Bride testimonial model and DTOs.

use orta_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `testimonials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Testimonial {
    pub id: DbId,
    pub bride_name: String,
    pub testimonial: String,
    pub image_url: Option<String>,
    pub wedding_date: Option<Date>,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestimonial {
    pub bride_name: String,
    pub testimonial: String,
    pub image_url: Option<String>,
    pub wedding_date: Option<Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestimonial {
    pub bride_name: Option<String>,
    pub testimonial: Option<String>,
    pub image_url: Option<String>,
    pub wedding_date: Option<Date>,
}
