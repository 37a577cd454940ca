//! Handlers for the `/analytics` resource.
//!
//! Tracking endpoints are public so the site can report anonymous
//! visitors. Listings and reports are admin-only.

use axum::extract::{Path, Query, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use orta_core::analytics::{
    rate, round2, session_summary, validate_conversion_type, validate_event_category,
    validate_event_fields, DEFAULT_REPORT_DAYS,
};
use orta_core::error::CoreError;
use orta_core::types::Date;
use orta_db::models::analytics::{
    AnalyticsEvent, AnalyticsSession, BusinessCounters, ConversionBreakdown, ConversionEvent,
    CreateAnalyticsEvent, CreateConversion, DailyTrend, EndSession, EventFilter, PageViews,
    StartSession, TrafficSource,
};
use orta_db::repositories::AnalyticsRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::client_ip::ClientIp;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub event_category: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversionQuery {
    pub conversion_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEvents {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub created_count: usize,
    pub events: Vec<AnalyticsEvent>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_visitors: i64,
    pub total_page_views: i64,
    pub total_conversions: i64,
    pub total_revenue: f64,
    pub conversion_rate: f64,
    pub avg_session_duration_secs: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TrendPoint {
    #[serde(flatten)]
    pub day: DailyTrend,
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub summary: DashboardSummary,
    pub popular_pages: Vec<PageViews>,
    pub conversion_breakdown: Vec<ConversionBreakdown>,
    pub daily_trends: Vec<TrendPoint>,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct BusinessInsights {
    pub business_metrics: BusinessCounters,
    pub traffic_sources: Vec<TrafficSource>,
    pub period: DateRange,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn check_event(event: &CreateAnalyticsEvent) -> Result<(), CoreError> {
    validate_event_category(&event.event_category)?;
    validate_event_fields(&event.event_name, &event.page_url)?;
    if event.session_id.trim().is_empty() {
        return Err(CoreError::Validation("session_id must not be empty".into()));
    }
    Ok(())
}

/// Fill request-derived fields the client did not send.
fn stamp_event(event: &mut CreateAnalyticsEvent, ip: &ClientIp, headers: &HeaderMap) {
    event.ip_address = ip.known();
    if event.user_agent.is_empty() {
        event.user_agent = user_agent(headers);
    }
}

/// Report period; defaults to the last 30 days ending today.
fn report_range(query: &ReportQuery) -> AppResult<DateRange> {
    let end_date = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = query
        .start_date
        .unwrap_or(end_date - Duration::days(DEFAULT_REPORT_DAYS));
    if start_date > end_date {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".into(),
        ));
    }
    Ok(DateRange {
        start_date,
        end_date,
    })
}

// ---------------------------------------------------------------------------
// Tracking (public)
// ---------------------------------------------------------------------------

/// POST /api/v1/analytics/events
pub async fn track_event(
    State(state): State<AppState>,
    ip: ClientIp,
    headers: HeaderMap,
    Json(mut input): Json<CreateAnalyticsEvent>,
) -> AppResult<impl IntoResponse> {
    check_event(&input)?;
    stamp_event(&mut input, &ip, &headers);
    let event = AnalyticsRepo::create_event(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// POST /api/v1/analytics/events/bulk
///
/// Events that fail to parse or validate are skipped.
pub async fn track_events_bulk(
    State(state): State<AppState>,
    ip: ClientIp,
    headers: HeaderMap,
    Json(input): Json<BulkEvents>,
) -> AppResult<impl IntoResponse> {
    let submitted = input.events.len();
    let mut events = Vec::with_capacity(submitted);
    for raw in input.events {
        let mut event = match serde_json::from_value::<CreateAnalyticsEvent>(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed analytics event");
                continue;
            }
        };
        if let Err(e) = check_event(&event) {
            tracing::debug!(error = %e, "Skipping invalid analytics event");
            continue;
        }
        stamp_event(&mut event, &ip, &headers);
        events.push(AnalyticsRepo::create_event(&state.pool, &event).await?);
    }

    tracing::debug!(submitted, created = events.len(), "Bulk analytics events stored");
    Ok((
        StatusCode::CREATED,
        Json(BulkResult {
            created_count: events.len(),
            events,
        }),
    ))
}

/// POST /api/v1/analytics/conversions
pub async fn track_conversion(
    State(state): State<AppState>,
    Json(input): Json<CreateConversion>,
) -> AppResult<impl IntoResponse> {
    validate_conversion_type(&input.conversion_type)?;
    if input.conversion_value.is_some_and(|v| v < 0.0 || !v.is_finite()) {
        return Err(AppError::BadRequest(
            "conversion_value must be a non-negative number".into(),
        ));
    }
    let conversion = AnalyticsRepo::create_conversion(&state.pool, &input).await?;
    tracing::info!(
        conversion_id = conversion.id,
        conversion_type = %conversion.conversion_type,
        "Conversion recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: conversion })))
}

/// POST /api/v1/analytics/sessions/start
pub async fn start_session(
    State(state): State<AppState>,
    ip: ClientIp,
    headers: HeaderMap,
    Json(mut input): Json<StartSession>,
) -> AppResult<impl IntoResponse> {
    if input.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".into()));
    }
    input.ip_address = ip.known();
    if input.user_agent.is_empty() {
        input.user_agent = user_agent(&headers);
    }
    let session = AnalyticsRepo::start_session(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// PATCH /api/v1/analytics/sessions/{session_id}/end
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<DataResponse<AnalyticsSession>>> {
    let not_found = || AppError::NotFound(format!("Session '{session_id}' not found"));
    let session = AnalyticsRepo::find_session(&state.pool, &session_id)
        .await?
        .ok_or_else(not_found)?;

    let page_views = AnalyticsRepo::count_page_views_for_session(&state.pool, &session_id).await?;
    let conversion = AnalyticsRepo::first_conversion_for_session(&state.pool, &session_id).await?;
    let end_time = Utc::now();
    let summary = session_summary(session.start_time, end_time, page_views, conversion);

    let ended = AnalyticsRepo::end_session(
        &state.pool,
        &session_id,
        &EndSession {
            end_time,
            duration_secs: summary.duration_secs,
            page_views: summary.page_views,
            bounce_rate: summary.bounce_rate,
            is_converted: summary.is_converted,
            conversion_type: summary.conversion_type,
        },
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(Json(DataResponse { data: ended }))
}

// ---------------------------------------------------------------------------
// Back office
// ---------------------------------------------------------------------------

/// GET /api/v1/analytics/events
pub async fn list_events(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<AnalyticsEvent>>> {
    let filter = EventFilter {
        event_category: query.event_category,
        session_id: query.session_id,
    };
    let events =
        AnalyticsRepo::list_events(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(ListResponse::new(events)))
}

/// GET /api/v1/analytics/conversions
pub async fn list_conversions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ConversionQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ListResponse<ConversionEvent>>> {
    let conversions = AnalyticsRepo::list_conversions(
        &state.pool,
        query.conversion_type.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(ListResponse::new(conversions)))
}

/// GET /api/v1/analytics/reports/dashboard?start_date=&end_date=
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<DataResponse<DashboardReport>>> {
    let range = report_range(&query)?;
    let (start, end) = (range.start_date, range.end_date);

    let totals = AnalyticsRepo::dashboard_totals(&state.pool, start, end).await?;
    let popular_pages = AnalyticsRepo::popular_pages(&state.pool, start, end).await?;
    let conversion_breakdown = AnalyticsRepo::conversion_breakdown(&state.pool, start, end).await?;
    let daily_trends = AnalyticsRepo::daily_trends(&state.pool, start, end)
        .await?
        .into_iter()
        .map(|day| TrendPoint {
            conversion_rate: rate(day.conversions, day.visitors),
            day,
        })
        .collect();

    Ok(Json(DataResponse {
        data: DashboardReport {
            summary: DashboardSummary {
                total_visitors: totals.total_visitors,
                total_page_views: totals.total_page_views,
                total_conversions: totals.total_conversions,
                total_revenue: round2(totals.total_revenue),
                conversion_rate: rate(totals.total_conversions, totals.total_visitors),
                avg_session_duration_secs: totals.avg_session_duration_secs.map(round2),
            },
            popular_pages,
            conversion_breakdown,
            daily_trends,
            date_range: range,
        },
    }))
}

/// GET /api/v1/analytics/reports/business-insights
pub async fn business_insights(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<DataResponse<BusinessInsights>>> {
    let range = report_range(&query)?;
    let business_metrics =
        AnalyticsRepo::business_counters(&state.pool, range.start_date, range.end_date).await?;
    let traffic_sources =
        AnalyticsRepo::traffic_sources(&state.pool, range.start_date, range.end_date).await?;
    Ok(Json(DataResponse {
        data: BusinessInsights {
            business_metrics,
            traffic_sources,
            period: range,
        },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn report_range_defaults_to_last_thirty_days() {
        let range = report_range(&ReportQuery {
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31),
        })
        .unwrap();
        assert_eq!(range.start_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn report_range_rejects_inverted_period() {
        let result = report_range(&ReportQuery {
            start_date: NaiveDate::from_ymd_opt(2026, 4, 2),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 1),
        });
        assert!(result.is_err());
    }
}
