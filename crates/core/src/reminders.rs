//! Appointment reminder planning.
//!
//! Each booking gets up to three reminders: an email and a WhatsApp the
//! day before, plus a short email two hours before. Reminders that would
//! already be due at booking time are not planned.

use chrono::{Duration, TimeZone, Utc};

use crate::channels::{CHANNEL_EMAIL, CHANNEL_WHATSAPP};
use crate::types::{Date, Time, Timestamp};

/// Reminder kinds planned for every appointment: `(type, hours_before)`.
pub const REMINDER_PLAN: &[(&str, i32)] = &[
    (CHANNEL_EMAIL, 24),
    (CHANNEL_WHATSAPP, 24),
    (CHANNEL_EMAIL, 2),
];

/// How far back the sweep looks for reminders it may have missed.
pub const SWEEP_GRACE_MINUTES: i64 = 30;

/// Sent reminders older than this are purged by the sweep.
pub const SENT_RETENTION_DAYS: i64 = 7;

/// Lookahead used by the back-office "upcoming reminders" view.
pub const UPCOMING_WINDOW_HOURS: i64 = 2;

/// A reminder that should be stored for later delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub reminder_type: &'static str,
    pub hours_before: i32,
    pub scheduled_time: Timestamp,
}

/// Combine an appointment's local date and time into a timestamp.
///
/// Appointment times are stored as naive wall-clock values and treated as UTC.
pub fn appointment_instant(date: Date, time: Time) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Plan the reminders for an appointment.
///
/// Reminders whose channel has no contact detail, or whose time is not in
/// the future, are skipped.
pub fn planned_reminders(
    appointment_at: Timestamp,
    now: Timestamp,
    has_email: bool,
    has_phone: bool,
) -> Vec<PlannedReminder> {
    REMINDER_PLAN
        .iter()
        .filter(|(kind, _)| match *kind {
            CHANNEL_EMAIL => has_email,
            CHANNEL_WHATSAPP => has_phone,
            _ => false,
        })
        .map(|(kind, hours)| PlannedReminder {
            reminder_type: *kind,
            hours_before: *hours,
            scheduled_time: appointment_at - Duration::hours(i64::from(*hours)),
        })
        .filter(|r| r.scheduled_time > now)
        .collect()
}

/// The `[from, to]` window of reminders a sweep at `now` should send.
pub fn reminder_window(now: Timestamp, hours_ahead: i64) -> (Timestamp, Timestamp) {
    (
        now - Duration::minutes(SWEEP_GRACE_MINUTES),
        now + Duration::hours(hours_ahead),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32) -> Timestamp {
        appointment_instant(
            Date::from_ymd_opt(2030, 6, d).unwrap(),
            Time::from_hms_opt(h, 0, 0).unwrap(),
        )
    }

    #[test]
    fn far_appointment_gets_all_three() {
        let plan = planned_reminders(at(10, 10), at(3, 10), true, true);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].scheduled_time, at(9, 10));
        assert_eq!(plan[2].hours_before, 2);
        assert_eq!(plan[2].scheduled_time, at(10, 8));
    }

    #[test]
    fn next_day_booking_skips_past_reminders() {
        // Booked at 12:00 for 10:00 the next day: the 24h reminders are already past.
        let plan = planned_reminders(at(4, 10), at(3, 12), true, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].reminder_type, CHANNEL_EMAIL);
        assert_eq!(plan[0].hours_before, 2);
    }

    #[test]
    fn missing_phone_skips_whatsapp() {
        let plan = planned_reminders(at(10, 10), at(3, 10), true, false);
        assert!(plan.iter().all(|r| r.reminder_type == CHANNEL_EMAIL));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn missing_email_keeps_only_whatsapp() {
        let plan = planned_reminders(at(10, 10), at(3, 10), false, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].reminder_type, CHANNEL_WHATSAPP);
    }

    #[test]
    fn window_includes_grace_period() {
        let now = at(5, 12);
        let (from, to) = reminder_window(now, 1);
        assert_eq!(now - from, Duration::minutes(30));
        assert_eq!(to - now, Duration::hours(1));
    }
}
