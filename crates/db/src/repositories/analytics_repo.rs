//! Repository for `analytics_events`, `conversion_events` and `analytics_sessions`.

use orta_core::analytics::{CATEGORY_PAGE_VIEW, CONVERSION_APPOINTMENT_SCHEDULED, DEFAULT_CURRENCY};
use orta_core::types::Date;
use sqlx::PgPool;

use crate::models::analytics::{
    AnalyticsEvent, AnalyticsSession, BusinessCounters, ConversionBreakdown, ConversionEvent,
    CreateAnalyticsEvent, CreateConversion, DailyTrend, DashboardTotals, EndSession, EventFilter,
    PageViews, StartSession, TrafficSource,
};

const EVENT_COLUMNS: &str = "id, event_name, event_category, event_label, event_value, user_id, \
                             session_id, user_agent, ip_address, page_url, page_title, referrer, \
                             custom_parameters, occurred_at, created_at";

const CONVERSION_COLUMNS: &str = "id, conversion_type, conversion_value, currency, user_id, \
                                  analytics_event_id, source, medium, campaign, conversion_data, \
                                  occurred_at, created_at";

const SESSION_COLUMNS: &str = "id, session_id, user_id, start_time, end_time, duration_secs, \
                               page_views, user_agent, ip_address, referrer, bounce_rate, \
                               is_converted, conversion_type, created_at, updated_at";

/// Number of rows in the popular-pages report.
const POPULAR_PAGES_LIMIT: i64 = 10;

/// Number of rows in the traffic-sources report.
const TRAFFIC_SOURCES_LIMIT: i64 = 5;

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub async fn create_event(
        pool: &PgPool,
        input: &CreateAnalyticsEvent,
    ) -> Result<AnalyticsEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO analytics_events
                (event_name, event_category, event_label, event_value, user_id, session_id,
                 user_agent, ip_address, page_url, page_title, referrer, custom_parameters,
                 occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                     COALESCE($12, '{{}}'::jsonb), COALESCE($13, NOW()))
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(&input.event_name)
            .bind(&input.event_category)
            .bind(&input.event_label)
            .bind(input.event_value)
            .bind(input.user_id)
            .bind(&input.session_id)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .bind(&input.page_url)
            .bind(&input.page_title)
            .bind(&input.referrer)
            .bind(&input.custom_parameters)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    pub async fn list_events(
        pool: &PgPool,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnalyticsEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM analytics_events
             WHERE ($1::TEXT IS NULL OR event_category = $1)
               AND ($2::TEXT IS NULL OR session_id = $2)
             ORDER BY occurred_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(&filter.event_category)
            .bind(&filter.session_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_page_views_for_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM analytics_events WHERE session_id = $1 AND event_category = $2",
        )
        .bind(session_id)
        .bind(CATEGORY_PAGE_VIEW)
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------------

    pub async fn create_conversion(
        pool: &PgPool,
        input: &CreateConversion,
    ) -> Result<ConversionEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversion_events
                (conversion_type, conversion_value, currency, user_id, analytics_event_id,
                 source, medium, campaign, conversion_data)
             VALUES ($1, $2, COALESCE($3, $4), $5, $6, $7, $8, $9, COALESCE($10, '{{}}'::jsonb))
             RETURNING {CONVERSION_COLUMNS}"
        );
        sqlx::query_as::<_, ConversionEvent>(&query)
            .bind(&input.conversion_type)
            .bind(input.conversion_value)
            .bind(&input.currency)
            .bind(DEFAULT_CURRENCY)
            .bind(input.user_id)
            .bind(input.analytics_event_id)
            .bind(&input.source)
            .bind(&input.medium)
            .bind(&input.campaign)
            .bind(&input.conversion_data)
            .fetch_one(pool)
            .await
    }

    pub async fn list_conversions(
        pool: &PgPool,
        conversion_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversionEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {CONVERSION_COLUMNS} FROM conversion_events
             WHERE ($1::TEXT IS NULL OR conversion_type = $1)
             ORDER BY occurred_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ConversionEvent>(&query)
            .bind(conversion_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Type of the earliest conversion attached to an event of the session.
    pub async fn first_conversion_for_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT c.conversion_type
             FROM conversion_events c
             JOIN analytics_events e ON e.id = c.analytics_event_id
             WHERE e.session_id = $1
             ORDER BY c.occurred_at, c.id
             LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub async fn start_session(
        pool: &PgPool,
        input: &StartSession,
    ) -> Result<AnalyticsSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO analytics_sessions (session_id, user_id, user_agent, ip_address, referrer)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsSession>(&query)
            .bind(&input.session_id)
            .bind(input.user_id)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .bind(&input.referrer)
            .fetch_one(pool)
            .await
    }

    pub async fn find_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<AnalyticsSession>, sqlx::Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM analytics_sessions WHERE session_id = $1");
        sqlx::query_as::<_, AnalyticsSession>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn end_session(
        pool: &PgPool,
        session_id: &str,
        input: &EndSession,
    ) -> Result<Option<AnalyticsSession>, sqlx::Error> {
        let query = format!(
            "UPDATE analytics_sessions SET
                end_time = $2,
                duration_secs = $3,
                page_views = $4,
                bounce_rate = $5,
                is_converted = $6,
                conversion_type = $7
             WHERE session_id = $1
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsSession>(&query)
            .bind(session_id)
            .bind(input.end_time)
            .bind(input.duration_secs)
            .bind(input.page_views)
            .bind(input.bounce_rate)
            .bind(input.is_converted)
            .bind(&input.conversion_type)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Reports
    // -----------------------------------------------------------------------

    /// Headline totals for `[start, end]` (inclusive dates).
    pub async fn dashboard_totals(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<DashboardTotals, sqlx::Error> {
        sqlx::query_as::<_, DashboardTotals>(
            "SELECT
                (SELECT COUNT(*) FROM analytics_sessions
                  WHERE start_time::date BETWEEN $1 AND $2) AS total_visitors,
                (SELECT COUNT(*) FROM analytics_events
                  WHERE event_category = $3 AND occurred_at::date BETWEEN $1 AND $2) AS total_page_views,
                (SELECT COUNT(*) FROM conversion_events
                  WHERE occurred_at::date BETWEEN $1 AND $2) AS total_conversions,
                (SELECT COALESCE(SUM(conversion_value), 0)::FLOAT8 FROM conversion_events
                  WHERE occurred_at::date BETWEEN $1 AND $2) AS total_revenue,
                (SELECT AVG(duration_secs)::FLOAT8 FROM analytics_sessions
                  WHERE start_time::date BETWEEN $1 AND $2
                    AND duration_secs IS NOT NULL) AS avg_session_duration_secs",
        )
        .bind(start)
        .bind(end)
        .bind(CATEGORY_PAGE_VIEW)
        .fetch_one(pool)
        .await
    }

    pub async fn popular_pages(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<PageViews>, sqlx::Error> {
        sqlx::query_as::<_, PageViews>(
            "SELECT page_url, COUNT(*) AS views FROM analytics_events
             WHERE event_category = $1 AND occurred_at::date BETWEEN $2 AND $3
             GROUP BY page_url
             ORDER BY views DESC, page_url
             LIMIT $4",
        )
        .bind(CATEGORY_PAGE_VIEW)
        .bind(start)
        .bind(end)
        .bind(POPULAR_PAGES_LIMIT)
        .fetch_all(pool)
        .await
    }

    pub async fn conversion_breakdown(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<ConversionBreakdown>, sqlx::Error> {
        sqlx::query_as::<_, ConversionBreakdown>(
            "SELECT conversion_type, COUNT(*) AS count,
                    COALESCE(SUM(conversion_value), 0)::FLOAT8 AS revenue
             FROM conversion_events
             WHERE occurred_at::date BETWEEN $1 AND $2
             GROUP BY conversion_type
             ORDER BY count DESC, conversion_type",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// One row per day in `[start, end]`, including days with no traffic.
    pub async fn daily_trends(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyTrend>, sqlx::Error> {
        sqlx::query_as::<_, DailyTrend>(
            "SELECT d::date AS date,
                    (SELECT COUNT(*) FROM analytics_sessions s
                      WHERE s.start_time::date = d::date) AS visitors,
                    (SELECT COUNT(*) FROM conversion_events c
                      WHERE c.occurred_at::date = d::date) AS conversions,
                    (SELECT COALESCE(SUM(c.conversion_value), 0)::FLOAT8 FROM conversion_events c
                      WHERE c.occurred_at::date = d::date) AS revenue
             FROM generate_series($1::date, $2::date, INTERVAL '1 day') AS d
             ORDER BY d",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// Appointment conversions and mentions of dresses/testimonials in event names.
    pub async fn business_counters(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<BusinessCounters, sqlx::Error> {
        sqlx::query_as::<_, BusinessCounters>(
            "SELECT
                (SELECT COUNT(*) FROM conversion_events
                  WHERE conversion_type = $3 AND occurred_at::date BETWEEN $1 AND $2)
                  AS appointment_conversions,
                (SELECT COUNT(*) FROM analytics_events
                  WHERE event_name ILIKE '%dress%' AND occurred_at::date BETWEEN $1 AND $2)
                  AS dress_inquiries,
                (SELECT COUNT(*) FROM analytics_events
                  WHERE event_name ILIKE '%testimonial%' AND occurred_at::date BETWEEN $1 AND $2)
                  AS testimonial_engagement",
        )
        .bind(start)
        .bind(end)
        .bind(CONVERSION_APPOINTMENT_SCHEDULED)
        .fetch_one(pool)
        .await
    }

    /// Most common referrers of page views.
    pub async fn traffic_sources(
        pool: &PgPool,
        start: Date,
        end: Date,
    ) -> Result<Vec<TrafficSource>, sqlx::Error> {
        sqlx::query_as::<_, TrafficSource>(
            "SELECT COALESCE(referrer, custom_parameters->>'referrer') AS referrer,
                    COUNT(*) AS count
             FROM analytics_events
             WHERE event_category = $1 AND occurred_at::date BETWEEN $2 AND $3
             GROUP BY 1
             ORDER BY count DESC
             LIMIT $4",
        )
        .bind(CATEGORY_PAGE_VIEW)
        .bind(start)
        .bind(end)
        .bind(TRAFFIC_SOURCES_LIMIT)
        .fetch_all(pool)
        .await
    }

    pub async fn count_events(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events")
            .fetch_one(pool)
            .await
    }
}
