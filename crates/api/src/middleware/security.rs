//! Request screening and security-relevant response logging.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::header::USER_AGENT;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use orta_core::security::is_suspicious;

use super::client_ip;

/// Log suspicious requests and every 401/403/429 response with the client IP.
pub async fn screen(req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip::resolve(req.headers(), peer);
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if is_suspicious(&target, &user_agent) {
        tracing::warn!(
            ip = %ip,
            method = %method,
            target = %target,
            user_agent = %user_agent,
            "Suspicious request pattern"
        );
    }

    let response = next.run(req).await;

    let status = response.status();
    if matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) {
        tracing::warn!(
            ip = %ip,
            method = %method,
            target = %target,
            status = status.as_u16(),
            "Security-relevant response"
        );
    }

    response
}
