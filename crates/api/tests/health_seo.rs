mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, build_test_app, get, get_auth, user_with_token};
use orta_core::roles::ROLE_ADMIN;
use orta_db::models::dress::CreateDress;
use orta_db::repositories::DressRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Health and monitoring
// ---------------------------------------------------------------------------

/// Health reports the service as healthy when the database answers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_ok(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "ortanovias-backend");
}

/// Every response carries the security headers and a request id.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_security_headers(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/health").await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "same-origin");
    assert!(headers.contains_key("x-request-id"));
}

/// The root path describes the API.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_api_info(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Orta Novias API");
    assert_eq!(json["endpoints"]["appointments"], "/api/v1/appointments/");
}

/// Metrics are exposed in Prometheus text format.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_metrics_text(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("service_database_up 1"));
    assert!(text.contains("# TYPE"));
}

/// Monitoring is a staff-only JSON snapshot.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_monitoring(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = get(app.clone(), "/api/monitoring").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let response = get_auth(app, "/api/monitoring", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["service"], "ortanovias-backend");
    assert_eq!(json["database"]["status"], "healthy");
}

// ---------------------------------------------------------------------------
// SEO
// ---------------------------------------------------------------------------

/// robots.txt points crawlers at the sitemap.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_robots_txt(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/robots.txt").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("Disallow: /api/"));
    assert!(text.contains("Sitemap: https://ortanovias.com/sitemap.xml"));
}

/// The sitemap lists available dresses.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sitemap_lists_dresses(pool: PgPool) {
    let dress = DressRepo::create(
        &pool,
        &CreateDress {
            name: "Aurora".to_string(),
            description: None,
            image_url: None,
            style: None,
            available: None,
        },
    )
    .await
    .unwrap();
    let app = build_test_app(pool);

    let response = get(app, "/sitemap.xml").await;

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("<urlset"));
    assert!(xml.contains(&format!("https://ortanovias.com/vestidos/{}/", dress.id)));
}

/// Structured data exists for known pages only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_structured_data_pages(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/structured-data/home").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["page"], "home");

    let response = get(app, "/structured-data/blog").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
