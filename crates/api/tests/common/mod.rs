#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use orta_api::auth::jwt::JwtConfig;
use orta_api::auth::password::hash_password;
use orta_api::config::{RateLimitConfig, ServerConfig};
use orta_api::router::build_app_router;
use orta_api::state::AppState;
use orta_core::business_hours::next_working_day;
use orta_core::types::Date;
use orta_db::models::user::{CreateUser, User};
use orta_db::repositories::UserRepo;
use orta_events::{EventBus, NotificationDispatcher};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password used for every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "Velo-Marfil-2026";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and the default rate limits.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        site_url: "https://ortanovias.com".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests-only".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        rate_limit: RateLimitConfig::default(),
    }
}

/// Build the full application router over `pool`.
///
/// The dispatcher has no delivery channels attached, so email and WhatsApp
/// notifications fail deterministically while internal ones succeed.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).0
}

/// Like [`build_test_app`], also returning the event bus so tests can
/// subscribe to what handlers publish.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let bus = Arc::new(EventBus::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(pool.clone(), bus.clone()));
    let state = AppState::new(pool, test_config(), bus.clone(), dispatcher);
    (build_app_router(state), bus)
}

/// A working day at least a week out, so bookings are never in the past.
pub fn future_working_day() -> Date {
    next_working_day(Utc::now().date_naive() + Duration::days(7))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] directly through the repository.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: Some("+34600111222".to_string()),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(app: &Router, username: &str) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "login": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), 200, "login for {username} failed");
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

/// Create a user with `role` and log them in. Returns `(user, token)`.
pub async fn user_with_token(pool: &PgPool, app: &Router, username: &str, role: &str) -> (User, String) {
    let user = create_user(pool, username, role).await;
    let token = login(app, username).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("serializable body"))
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).expect("valid request"))
        .await
        .expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PATCH, uri, None, Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
