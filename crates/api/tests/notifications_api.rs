mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get_auth, post_auth, post_json_auth, user_with_token};
use orta_core::messages::TEST_TITLE_PREFIX;
use orta_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use serde_json::{json, Value};
use sqlx::PgPool;

fn test_message(user_id: i64, kind: &str) -> Value {
    json!({
        "user_id": user_id,
        "type": kind,
        "title": "Prueba de canal",
        "message": "Mensaje de prueba desde el panel"
    })
}

/// Internal test notifications are delivered and their title is prefixed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_test_internal(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let (client, _) = user_with_token(&pool, &app, "novia", ROLE_CLIENT).await;

    let response = post_json_auth(
        app,
        "/api/v1/notifications/send-test",
        test_message(client.id, "internal"),
        &admin,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["sent"], true);
    let notification = &json["data"]["notification"];
    assert_eq!(notification["status"], "sent");
    assert_eq!(notification["recipient"], "novia@example.com");
    assert!(notification["title"]
        .as_str()
        .unwrap()
        .starts_with(TEST_TITLE_PREFIX));
}

/// Without a configured email channel the delivery fails and is recorded.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_test_email_without_channel(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let (client, _) = user_with_token(&pool, &app, "novia", ROLE_CLIENT).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/notifications/send-test",
        test_message(client.id, "email"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["sent"], false);
    assert_eq!(json["data"]["notification"]["status"], "failed");
    assert_eq!(
        json["data"]["notification"]["error_message"],
        "channel not configured"
    );

    let response = get_auth(app, "/api/v1/notifications/stats", &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["failed"], 1);
    assert_eq!(json["data"]["success_rate"], 0.0);
}

/// Unknown channels and unknown users are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_send_test_validation(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin_user, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/notifications/send-test",
        test_message(admin_user.id, "telegram"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/notifications/send-test",
        test_message(999_999, "internal"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Customers only see their own notifications and can mark them read.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_visibility_and_read_state(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let (ana, ana_token) = user_with_token(&pool, &app, "ana", ROLE_CLIENT).await;
    let (eva, _) = user_with_token(&pool, &app, "eva", ROLE_CLIENT).await;

    let mut ids = Vec::new();
    for user_id in [ana.id, eva.id] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/notifications/send-test",
            test_message(user_id, "internal"),
            &admin,
        )
        .await;
        ids.push(body_json(response).await["data"]["notification"]["id"].as_i64().unwrap());
    }
    let (ana_notification, eva_notification) = (ids[0], ids[1]);

    let response = get_auth(app.clone(), "/api/v1/notifications", &ana_token).await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["id"], ana_notification);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/notifications/{eva_notification}"),
        &ana_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", &ana_token).await;
    assert_eq!(body_json(response).await["data"]["unread_count"], 1);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{ana_notification}/read"),
        &ana_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, "/api/v1/notifications/unread-count", &ana_token).await;
    assert_eq!(body_json(response).await["data"]["unread_count"], 0);
}

/// Bulk mark-read needs at least one id and skips other users' rows.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_many_read(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;
    let (ana, ana_token) = user_with_token(&pool, &app, "ana", ROLE_CLIENT).await;
    let (eva, _) = user_with_token(&pool, &app, "eva", ROLE_CLIENT).await;

    let mut ids = Vec::new();
    for user_id in [ana.id, ana.id, eva.id] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/notifications/send-test",
            test_message(user_id, "internal"),
            &admin,
        )
        .await;
        ids.push(body_json(response).await["data"]["notification"]["id"].as_i64().unwrap());
    }

    let response = post_json_auth(
        app.clone(),
        "/api/v1/notifications/read",
        json!({ "ids": [] }),
        &ana_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/notifications/read",
        json!({ "ids": ids }),
        &ana_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["updated_count"], 2);
}

/// A delivered notification is only resent with `force_resend`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resend_requires_force_for_sent(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin_user, admin) = user_with_token(&pool, &app, "admin", ROLE_ADMIN).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/notifications/send-test",
        test_message(admin_user.id, "internal"),
        &admin,
    )
    .await;
    let id = body_json(response).await["data"]["notification"]["id"]
        .as_i64()
        .unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/notifications/{id}/resend"),
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        &format!("/api/v1/notifications/{id}/resend"),
        json!({ "force_resend": true }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["sent"], true);
}

/// Delivery stats are staff-only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_requires_admin(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, client) = user_with_token(&pool, &app, "novia", ROLE_CLIENT).await;

    let response = get_auth(app, "/api/v1/notifications/stats", &client).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
