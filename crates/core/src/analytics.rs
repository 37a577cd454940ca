//! Analytics vocabulary and session/report arithmetic.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

pub const CATEGORY_PAGE_VIEW: &str = "page_view";

/// Accepted `event_category` values.
pub const EVENT_CATEGORIES: &[&str] = &[
    CATEGORY_PAGE_VIEW,
    "user_interaction",
    "conversion",
    "engagement",
    "error",
    "performance",
    "form_interaction",
    "business_event",
];

pub const CONVERSION_APPOINTMENT_SCHEDULED: &str = "appointment_scheduled";

/// Accepted `conversion_type` values.
pub const CONVERSION_TYPES: &[&str] = &[
    CONVERSION_APPOINTMENT_SCHEDULED,
    "dress_inquiry",
    "contact_form",
    "phone_call",
    "email_inquiry",
    "testimonial_submission",
];

/// Currency recorded when a conversion does not state one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Default reporting period for dashboards, in days.
pub const DEFAULT_REPORT_DAYS: i64 = 30;

/// Maximum length of an event name.
pub const MAX_EVENT_NAME_LENGTH: usize = 100;

/// Maximum length of a tracked URL.
pub const MAX_URL_LENGTH: usize = 500;

/// Validate the category of an incoming analytics event.
pub fn validate_event_category(category: &str) -> Result<(), CoreError> {
    if EVENT_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown event category '{category}'"
        )))
    }
}

/// Validate the type of an incoming conversion.
pub fn validate_conversion_type(kind: &str) -> Result<(), CoreError> {
    if CONVERSION_TYPES.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown conversion type '{kind}'"
        )))
    }
}

/// Validate the required text fields of an analytics event.
pub fn validate_event_fields(event_name: &str, page_url: &str) -> Result<(), CoreError> {
    if event_name.trim().is_empty() {
        return Err(CoreError::Validation("event_name must not be empty".into()));
    }
    if event_name.chars().count() > MAX_EVENT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "event_name exceeds {MAX_EVENT_NAME_LENGTH} characters"
        )));
    }
    if page_url.trim().is_empty() {
        return Err(CoreError::Validation("page_url must not be empty".into()));
    }
    if page_url.chars().count() > MAX_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "page_url exceeds {MAX_URL_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session summary
// ---------------------------------------------------------------------------

/// Engagement figures computed when a visitor session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub duration_secs: i64,
    pub page_views: i32,
    pub bounce_rate: f64,
    pub is_converted: bool,
    pub conversion_type: Option<String>,
}

/// Summarize a session from its bounds, page views and first conversion.
///
/// A session with at most one page view counts as a bounce.
pub fn session_summary(
    start: Timestamp,
    end: Timestamp,
    page_views: i64,
    conversion_type: Option<String>,
) -> SessionSummary {
    let duration_secs = (end - start).num_seconds().max(0);
    let page_views = i32::try_from(page_views).unwrap_or(i32::MAX);
    SessionSummary {
        duration_secs,
        page_views,
        bounce_rate: if page_views <= 1 { 1.0 } else { 0.0 },
        is_converted: conversion_type.is_some(),
        conversion_type,
    }
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage rounded to two decimals; zero when `whole` is zero.
pub fn rate(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Delivery success rate: sent notifications over all notifications.
pub fn success_rate(sent: i64, total: i64) -> f64 {
    rate(sent, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn page_view_is_a_known_category() {
        assert!(validate_event_category("page_view").is_ok());
        assert!(validate_event_category("pageview").is_err());
    }

    #[test]
    fn unknown_conversion_type_is_rejected() {
        assert!(validate_conversion_type("dress_inquiry").is_ok());
        assert!(validate_conversion_type("purchase").is_err());
    }

    #[test]
    fn event_fields_require_name_and_url() {
        assert!(validate_event_fields("view_dress", "https://ortanovias.com/").is_ok());
        assert!(validate_event_fields(" ", "https://ortanovias.com/").is_err());
        assert!(validate_event_fields("view_dress", "").is_err());
    }

    #[test]
    fn single_page_session_bounces() {
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        let summary = session_summary(start, start + Duration::seconds(95), 1, None);
        assert_eq!(summary.duration_secs, 95);
        assert_eq!(summary.bounce_rate, 1.0);
        assert!(!summary.is_converted);
    }

    #[test]
    fn converted_session_records_type() {
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        let summary = session_summary(
            start,
            start + Duration::minutes(5),
            4,
            Some("appointment_scheduled".to_string()),
        );
        assert_eq!(summary.bounce_rate, 0.0);
        assert!(summary.is_converted);
        assert_eq!(summary.conversion_type.as_deref(), Some("appointment_scheduled"));
    }

    #[test]
    fn rate_rounds_and_handles_zero() {
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(5, 0), 0.0);
        assert_eq!(rate(2, 2), 100.0);
        assert_eq!(success_rate(0, 0), 0.0);
    }
}
