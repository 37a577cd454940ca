//! API description, health, monitoring and Prometheus metrics.

use std::fmt::Write as _;
use std::time::Instant;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use orta_db::repositories::{AnalyticsRepo, AppointmentRepo, DressRepo, NotificationRepo};
use orta_db::DatabaseStats;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "ortanovias-backend";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "Orta Novias API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "auth": "/api/v1/auth/",
            "users": "/api/v1/users/",
            "appointments": "/api/v1/appointments/",
            "dresses": "/api/v1/dresses/",
            "testimonials": "/api/v1/testimonials/",
            "notifications": "/api/v1/notifications/",
            "email_templates": "/api/v1/email-templates/",
            "reminders": "/api/v1/reminders/",
            "analytics": "/api/v1/analytics/",
            "metrics": "/api/metrics",
            "sitemap": "/sitemap.xml",
            "robots": "/robots.txt"
        }
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

/// GET /health and GET /api/health
///
/// 503 when the database does not answer.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (status_code, status) = match orta_db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };
    (
        status_code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now().to_rfc3339(),
            service: SERVICE_NAME,
        }),
    )
}

/// Database figures, with `up = false` when the database is unreachable.
async fn probe_database(state: &AppState) -> (bool, DatabaseStats, u128) {
    let started = Instant::now();
    match orta_db::database_stats(&state.pool).await {
        Ok(stats) => (true, stats, started.elapsed().as_millis()),
        Err(e) => {
            tracing::error!(error = %e, "Database probe failed");
            (false, DatabaseStats::default(), started.elapsed().as_millis())
        }
    }
}

/// GET /api/monitoring (admin)
pub async fn monitoring(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let (up, stats, response_time_ms) = probe_database(&state).await;

    let appointments = AppointmentRepo::count_by_status(&state.pool).await?;
    let notifications = NotificationRepo::stats(&state.pool).await?;
    let dresses_available = DressRepo::count_available(&state.pool).await?;
    let analytics_events = AnalyticsRepo::count_events(&state.pool).await?;

    Ok(Json(json!({
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "database": {
            "status": if up { "healthy" } else { "unhealthy" },
            "active_connections": stats.active_connections,
            "size_bytes": stats.size_bytes,
            "response_time_ms": response_time_ms,
        },
        "business": {
            "appointments": appointments,
            "notifications": notifications,
            "dresses_available": dresses_available,
            "analytics_events": analytics_events,
        }
    })))
}

/// Everything the Prometheus exposition reports.
#[derive(Debug, Default)]
pub struct MetricsSnapshot {
    pub database_up: bool,
    pub database: DatabaseStats,
    pub appointments_by_status: Vec<(String, i64)>,
    pub notifications_by_status: Vec<(String, i64)>,
    pub dresses_available: i64,
}

fn gauge(out: &mut String, name: &str, help: &str, value: i64) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {value}");
}

fn labelled(out: &mut String, name: &str, help: &str, rows: &[(String, i64)]) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
    for (status, count) in rows {
        let _ = writeln!(out, "{name}{{status=\"{status}\"}} {count}");
    }
}

/// Render a snapshot in the Prometheus text exposition format.
pub fn render_metrics(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();
    gauge(
        &mut out,
        "service_database_up",
        "Whether the database answers queries",
        i64::from(snapshot.database_up),
    );
    gauge(
        &mut out,
        "database_active_connections",
        "Connections to the application database",
        snapshot.database.active_connections,
    );
    gauge(
        &mut out,
        "database_size_bytes",
        "On-disk size of the application database",
        snapshot.database.size_bytes,
    );
    labelled(
        &mut out,
        "orta_appointments_total",
        "Appointments by status",
        &snapshot.appointments_by_status,
    );
    labelled(
        &mut out,
        "orta_notifications_total",
        "Notifications by status",
        &snapshot.notifications_by_status,
    );
    gauge(
        &mut out,
        "orta_dresses_available",
        "Dresses currently available",
        snapshot.dresses_available,
    );
    out
}

/// GET /api/metrics
///
/// Business counters are left out when the database is down.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (database_up, database, _) = probe_database(&state).await;
    let mut snapshot = MetricsSnapshot {
        database_up,
        database,
        ..Default::default()
    };

    if database_up {
        match AppointmentRepo::count_by_status(&state.pool).await {
            Ok(rows) => {
                snapshot.appointments_by_status =
                    rows.into_iter().map(|r| (r.status, r.count)).collect();
            }
            Err(e) => tracing::warn!(error = %e, "Metrics: appointment counts unavailable"),
        }
        match NotificationRepo::count_by_status(&state.pool).await {
            Ok(rows) => snapshot.notifications_by_status = rows,
            Err(e) => tracing::warn!(error = %e, "Metrics: notification counts unavailable"),
        }
        match DressRepo::count_available(&state.pool).await {
            Ok(n) => snapshot.dresses_available = n,
            Err(e) => tracing::warn!(error = %e, "Metrics: dress count unavailable"),
        }
    }

    (
        [(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        render_metrics(&snapshot),
    )
}
