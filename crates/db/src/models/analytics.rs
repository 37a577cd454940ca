//! Visitor analytics: raw events, conversions, sessions and report rows.

use orta_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A row from the `analytics_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalyticsEvent {
    pub id: DbId,
    pub event_name: String,
    pub event_category: String,
    pub event_label: Option<String>,
    pub event_value: Option<i32>,
    pub user_id: Option<DbId>,
    pub session_id: String,
    pub user_agent: String,
    pub ip_address: Option<String>,
    pub page_url: String,
    pub page_title: Option<String>,
    pub referrer: Option<String>,
    pub custom_parameters: serde_json::Value,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for recording an event. `user_agent` and `ip_address` are filled in
/// from the request, not the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnalyticsEvent {
    pub event_name: String,
    pub event_category: String,
    pub event_label: Option<String>,
    pub event_value: Option<i32>,
    pub user_id: Option<DbId>,
    pub session_id: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(skip)]
    pub ip_address: Option<String>,
    pub page_url: String,
    pub page_title: Option<String>,
    pub referrer: Option<String>,
    pub custom_parameters: Option<serde_json::Value>,
    pub occurred_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
pub struct EventFilter {
    pub event_category: Option<String>,
    pub session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// A row from the `conversion_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversionEvent {
    pub id: DbId,
    pub conversion_type: String,
    pub conversion_value: Option<f64>,
    pub currency: String,
    pub user_id: Option<DbId>,
    pub analytics_event_id: DbId,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub conversion_data: serde_json::Value,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversion {
    pub conversion_type: String,
    pub conversion_value: Option<f64>,
    pub currency: Option<String>,
    pub user_id: Option<DbId>,
    pub analytics_event_id: DbId,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub conversion_data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A row from the `analytics_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalyticsSession {
    pub id: DbId,
    pub session_id: String,
    pub user_id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_secs: Option<i64>,
    pub page_views: i32,
    pub user_agent: String,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub bounce_rate: f64,
    pub is_converted: bool,
    pub conversion_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSession {
    pub session_id: String,
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub user_agent: String,
    #[serde(skip)]
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
}

/// Values written when a session ends.
#[derive(Debug, Clone)]
pub struct EndSession {
    pub end_time: Timestamp,
    pub duration_secs: i64,
    pub page_views: i32,
    pub bounce_rate: f64,
    pub is_converted: bool,
    pub conversion_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Headline figures for the dashboard period.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct DashboardTotals {
    pub total_visitors: i64,
    pub total_page_views: i64,
    pub total_conversions: i64,
    pub total_revenue: f64,
    pub avg_session_duration_secs: Option<f64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageViews {
    pub page_url: String,
    pub views: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversionBreakdown {
    pub conversion_type: String,
    pub count: i64,
    pub revenue: f64,
}

/// One day of the dashboard trend series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyTrend {
    pub date: Date,
    pub visitors: i64,
    pub conversions: i64,
    pub revenue: f64,
}

/// Mention counters for the business-insights report.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct BusinessCounters {
    pub appointment_conversions: i64,
    pub dress_inquiries: i64,
    pub testimonial_engagement: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrafficSource {
    pub referrer: Option<String>,
    pub count: i64,
}
