mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get, post_json, post_json_auth, put_json_auth,
    user_with_token,
};
use orta_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Dresses
// ---------------------------------------------------------------------------

/// Staff manage the catalogue; visitors only read it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dress_crud(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/dresses",
        json!({
            "name": "  Aurora  ",
            "description": "Encaje chantilly con espalda al aire",
            "style": "sirena"
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Aurora");
    assert_eq!(json["data"]["available"], true);
    let id = json["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/dresses/{id}"),
        json!({ "available": false }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["available"], false);

    let response = get(app.clone(), "/api/v1/dresses?available_only=true").await;
    assert_eq!(body_json(response).await["count"], 0);

    let response = get(app.clone(), "/api/v1/dresses").await;
    assert_eq!(body_json(response).await["count"], 1);

    let response = delete_auth(app.clone(), &format!("/api/v1/dresses/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/dresses/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Customers cannot add dresses, and anonymous callers are not authenticated.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dress_create_requires_admin(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let body = json!({ "name": "Luna" });

    let response = post_json(app.clone(), "/api/v1/dresses", body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, client) = user_with_token(&pool, &app, "novia", ROLE_CLIENT).await;
    let response = post_json_auth(app, "/api/v1/dresses", body, &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A blank name is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dress_requires_name(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(app, "/api/v1/dresses", json!({ "name": "   " }), &admin).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Testimonials
// ---------------------------------------------------------------------------

/// Testimonials are created by staff and listed publicly.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_testimonial_create_and_list(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/testimonials",
        json!({
            "bride_name": "Carmen",
            "testimonial": "Encontré el vestido de mis sueños a la primera.",
            "wedding_date": "2026-05-16"
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app, "/api/v1/testimonials").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["bride_name"], "Carmen");
    assert_eq!(json["data"][0]["wedding_date"], "2026-05-16");
}

/// An empty testimonial text is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_testimonial_requires_text(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(
        app,
        "/api/v1/testimonials",
        json!({ "bride_name": "Carmen", "testimonial": "" }),
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
