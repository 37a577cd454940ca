//! Shop opening hours and appointment slot rules.
//!
//! The showroom takes appointments Monday to Friday in two windows,
//! 09:00–13:30 and 17:00–20:30. Both bounds are inclusive, so the last
//! bookable slot of each window starts exactly at its closing time.

use chrono::{Datelike, Duration, Timelike, Weekday};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Date, Time};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Morning window start, in minutes after midnight (09:00).
pub const MORNING_START_MIN: u32 = 9 * 60;
/// Morning window end, in minutes after midnight (13:30).
pub const MORNING_END_MIN: u32 = 13 * 60 + 30;
/// Evening window start, in minutes after midnight (17:00).
pub const EVENING_START_MIN: u32 = 17 * 60;
/// Evening window end, in minutes after midnight (20:30).
pub const EVENING_END_MIN: u32 = 20 * 60 + 30;

/// Spacing between bookable slots.
pub const SLOT_MINUTES: u32 = 30;

/// Days the showroom is open.
pub const WORKING_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Display names of the working days, in order.
const WORKING_DAY_NAMES: [&str; 5] = ["Lunes", "Martes", "Miércoles", "Jueves", "Viernes"];

pub const MSG_PAST_DATE: &str = "No se pueden programar citas en fechas pasadas.";
pub const MSG_WEEKEND: &str = "No se pueden programar citas los fines de semana. \
                               Por favor, selecciona un día entre lunes y viernes.";
pub const MSG_OUT_OF_HOURS: &str = "La hora seleccionada está fuera del horario de atención. \
                                    Horarios disponibles: 09:00-13:30 y 17:00-20:30.";

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Whether the showroom is open on `date`.
pub fn is_working_day(date: Date) -> bool {
    WORKING_DAYS.contains(&date.weekday())
}

/// Whether `time` falls inside one of the two opening windows.
pub fn is_working_time(time: Time) -> bool {
    let secs = time.num_seconds_from_midnight();
    let within = |start_min: u32, end_min: u32| secs >= start_min * 60 && secs <= end_min * 60;
    within(MORNING_START_MIN, MORNING_END_MIN) || within(EVENING_START_MIN, EVENING_END_MIN)
}

/// Check that an appointment can be booked at `date` + `time`.
///
/// Checks run in a fixed order (past date, weekend, opening hours) and the
/// first failing check determines the error message.
pub fn validate_appointment_datetime(date: Date, time: Time, today: Date) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::Validation(MSG_PAST_DATE.to_string()));
    }
    if !is_working_day(date) {
        return Err(CoreError::Validation(MSG_WEEKEND.to_string()));
    }
    if !is_working_time(time) {
        return Err(CoreError::Validation(MSG_OUT_OF_HOURS.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// All bookable slot start times as `HH:MM` strings, in chronological order.
pub fn working_time_slots() -> Vec<String> {
    let mut slots = Vec::new();
    for (start, end) in [
        (MORNING_START_MIN, MORNING_END_MIN),
        (EVENING_START_MIN, EVENING_END_MIN),
    ] {
        let mut minute = start;
        while minute <= end {
            slots.push(format!("{:02}:{:02}", minute / 60, minute % 60));
            minute += SLOT_MINUTES;
        }
    }
    slots
}

/// The first working day on or after `from`.
pub fn next_working_day(from: Date) -> Date {
    let mut date = from;
    while !is_working_day(date) {
        date += Duration::days(1);
    }
    date
}

/// Public description of the opening hours, served to the booking form.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessHoursInfo {
    pub working_days: Vec<&'static str>,
    pub morning_hours: String,
    pub evening_hours: String,
    pub available_slots: Vec<String>,
}

/// Build the [`BusinessHoursInfo`] payload.
pub fn business_hours_info() -> BusinessHoursInfo {
    let fmt = |m: u32| format!("{:02}:{:02}", m / 60, m % 60);
    BusinessHoursInfo {
        working_days: WORKING_DAY_NAMES.to_vec(),
        morning_hours: format!("{} - {}", fmt(MORNING_START_MIN), fmt(MORNING_END_MIN)),
        evening_hours: format!("{} - {}", fmt(EVENING_START_MIN), fmt(EVENING_END_MIN)),
        available_slots: working_time_slots(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> Time {
        Time::from_hms_opt(h, m, 0).unwrap()
    }

    // 2030-06-03 is a Monday.
    const TODAY: (i32, u32, u32) = (2030, 6, 3);

    fn today() -> Date {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn weekdays_are_working_days() {
        for d in 3..=7 {
            assert!(is_working_day(date(2030, 6, d)), "June {d} should be open");
        }
    }

    #[test]
    fn saturday_and_sunday_are_closed() {
        assert!(!is_working_day(date(2030, 6, 8)));
        assert!(!is_working_day(date(2030, 6, 9)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert!(is_working_time(time(9, 0)));
        assert!(is_working_time(time(13, 30)));
        assert!(is_working_time(time(17, 0)));
        assert!(is_working_time(time(20, 30)));
    }

    #[test]
    fn lunch_break_and_night_are_closed() {
        assert!(!is_working_time(time(14, 0)));
        assert!(!is_working_time(time(16, 59)));
        assert!(!is_working_time(time(8, 59)));
        assert!(!is_working_time(time(20, 31)));
    }

    #[test]
    fn seconds_past_closing_are_closed() {
        assert!(!is_working_time(Time::from_hms_opt(13, 30, 1).unwrap()));
    }

    #[test]
    fn valid_datetime_passes() {
        assert!(validate_appointment_datetime(date(2030, 6, 4), time(10, 0), today()).is_ok());
    }

    #[test]
    fn today_is_bookable() {
        assert!(validate_appointment_datetime(today(), time(18, 0), today()).is_ok());
    }

    #[test]
    fn past_date_is_rejected_first() {
        // A past Saturday at 14:00 fails on the date, not on the weekend or hour.
        let err = validate_appointment_datetime(date(2030, 6, 1), time(14, 0), today());
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg == MSG_PAST_DATE);
    }

    #[test]
    fn saturday_is_rejected() {
        let err = validate_appointment_datetime(date(2030, 6, 8), time(10, 0), today());
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg == MSG_WEEKEND);
    }

    #[test]
    fn two_pm_is_rejected() {
        let err = validate_appointment_datetime(date(2030, 6, 4), time(14, 0), today());
        assert_matches!(err, Err(CoreError::Validation(msg)) if msg == MSG_OUT_OF_HOURS);
    }

    #[test]
    fn slots_cover_both_windows() {
        let slots = working_time_slots();
        assert_eq!(slots.len(), 18);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert!(slots.contains(&"13:30".to_string()));
        assert!(!slots.contains(&"14:00".to_string()));
        assert!(slots.contains(&"17:00".to_string()));
        assert_eq!(slots.last().map(String::as_str), Some("20:30"));
    }

    #[test]
    fn next_working_day_skips_weekend() {
        assert_eq!(next_working_day(date(2030, 6, 8)), date(2030, 6, 10));
        assert_eq!(next_working_day(date(2030, 6, 9)), date(2030, 6, 10));
    }

    #[test]
    fn next_working_day_keeps_weekday() {
        assert_eq!(next_working_day(date(2030, 6, 5)), date(2030, 6, 5));
    }

    #[test]
    fn info_formats_windows() {
        let info = business_hours_info();
        assert_eq!(info.morning_hours, "09:00 - 13:30");
        assert_eq!(info.evening_hours, "17:00 - 20:30");
        assert_eq!(info.working_days.len(), 5);
        assert_eq!(info.working_days[0], "Lunes");
    }
}
