mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_auth, patch_json, post_json, user_with_token};
use orta_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use serde_json::{json, Value};
use sqlx::PgPool;

fn page_view(session_id: &str, path: &str) -> Value {
    json!({
        "event_name": "page_view",
        "event_category": "page_view",
        "session_id": session_id,
        "page_url": format!("https://ortanovias.com{path}"),
        "page_title": "Orta Novias"
    })
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

/// Events are public and stored with an empty custom parameter map.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_event(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/analytics/events", page_view("s-1", "/vestidos/")).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["event_category"], "page_view");
    assert_eq!(json["data"]["session_id"], "s-1");
    assert_eq!(json["data"]["custom_parameters"], json!({}));
}

/// Unknown categories are a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_event_rejects_unknown_category(pool: PgPool) {
    let app = build_test_app(pool);
    let mut event = page_view("s-1", "/");
    event["event_category"] = json!("pageview");

    let response = post_json(app, "/api/v1/analytics/events", event).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Bulk tracking stores the valid events and skips the rest.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_events_bulk_skips_invalid(pool: PgPool) {
    let app = build_test_app(pool);
    let mut bad_category = page_view("s-2", "/contacto/");
    bad_category["event_category"] = json!("nonsense");

    let response = post_json(
        app,
        "/api/v1/analytics/events/bulk",
        json!({
            "events": [
                page_view("s-2", "/"),
                { "event_name": "missing_fields" },
                bad_category,
                page_view("s-2", "/vestidos/")
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["created_count"], 2);
    assert_eq!(json["events"].as_array().unwrap().len(), 2);
}

/// Conversions must reference an existing event and use a known type.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_conversion(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app.clone(), "/api/v1/analytics/events", page_view("s-3", "/cita/")).await;
    let event_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/analytics/conversions",
        json!({ "conversion_type": "appointment_scheduled", "analytics_event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["currency"], "EUR");

    let response = post_json(
        app.clone(),
        "/api/v1/analytics/conversions",
        json!({ "conversion_type": "appointment_scheduled", "analytics_event_id": 987_654 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/analytics/conversions",
        json!({ "conversion_type": "purchase", "analytics_event_id": event_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Ending a session counts its page views and picks up its conversion.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_lifecycle(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/analytics/sessions/start",
        json!({ "session_id": "visit-42", "referrer": "https://www.google.com/" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut last_event = 0;
    for path in ["/", "/vestidos/", "/cita/"] {
        let response = post_json(app.clone(), "/api/v1/analytics/events", page_view("visit-42", path)).await;
        last_event = body_json(response).await["data"]["id"].as_i64().unwrap();
    }
    post_json(
        app.clone(),
        "/api/v1/analytics/conversions",
        json!({ "conversion_type": "appointment_scheduled", "analytics_event_id": last_event }),
    )
    .await;

    let response = patch_json(app, "/api/v1/analytics/sessions/visit-42/end", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["page_views"], 3);
    assert_eq!(data["bounce_rate"], 0.0);
    assert_eq!(data["is_converted"], true);
    assert_eq!(data["conversion_type"], "appointment_scheduled");
    assert!(data["end_time"].is_string());
}

/// Ending an unknown session is a 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_unknown_session(pool: PgPool) {
    let app = build_test_app(pool);

    let response = patch_json(app, "/api/v1/analytics/sessions/nope/end", json!({})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// The dashboard is staff-only and reports the default 30-day window.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_requires_admin(pool: PgPool) {
    let app = build_test_app(pool.clone());
    post_json(app.clone(), "/api/v1/analytics/events", page_view("s-9", "/")).await;

    let response = get(app.clone(), "/api/v1/analytics/reports/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, client) = user_with_token(&pool, &app, "novia", ROLE_CLIENT).await;
    let response = get_auth(app.clone(), "/api/v1/analytics/reports/dashboard", &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let response = get_auth(app, "/api/v1/analytics/reports/dashboard", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["summary"]["total_page_views"], 1);
    assert!(json["data"]["date_range"]["start_date"].is_string());
}

/// An inverted report period is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_rejects_inverted_period(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = get_auth(
        app,
        "/api/v1/analytics/reports/business-insights?start_date=2026-03-10&end_date=2026-03-01",
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
