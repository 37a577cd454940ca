//! Reminder schedule model.

use orta_core::types::{Date, DbId, Time, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reminder_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReminderSchedule {
    pub id: DbId,
    pub appointment_id: DbId,
    pub reminder_type: String,
    pub hours_before: i32,
    pub scheduled_time: Timestamp,
    pub is_sent: bool,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateReminder {
    pub appointment_id: DbId,
    pub reminder_type: String,
    pub hours_before: i32,
    pub scheduled_time: Timestamp,
}

/// An unsent reminder joined with the appointment it belongs to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DueReminder {
    pub id: DbId,
    pub appointment_id: DbId,
    pub reminder_type: String,
    pub hours_before: i32,
    pub scheduled_time: Timestamp,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date: Date,
    pub time: Time,
    pub status: String,
}

/// Filters for listing reminders.
#[derive(Debug, Default)]
pub struct ReminderFilter {
    pub pending_only: bool,
    pub reminder_type: Option<String>,
}
