//! Appointment (fitting booking) model and DTOs.

use orta_core::types::{Date, DbId, Time, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub confirmation_method: String,
    pub date: Date,
    pub time: Time,
    pub status: String,
    pub comment: Option<String>,
    pub auto_confirmed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an already-validated booking.
#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub confirmation_method: String,
    pub date: Date,
    pub time: Time,
    pub comment: Option<String>,
}

/// DTO for updating an appointment. All fields are optional; an empty
/// `phone` or `email` clears the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointment {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub confirmation_method: Option<String>,
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub status: Option<String>,
    pub comment: Option<String>,
}

/// Filters for listing appointments.
#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub status: Option<String>,
    pub date: Option<Date>,
}

/// Number of appointments in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
