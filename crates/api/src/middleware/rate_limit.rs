//! Per-IP request throttling for `/api/` routes.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use orta_core::security::RateLimiter;

use super::client_ip;
use crate::error::AppError;
use crate::state::AppState;

/// Path of the public booking endpoint, which has its own tighter limit.
pub const BOOKING_PATH: &str = "/api/v1/appointments";

fn limiter_for<'a>(state: &'a AppState, method: &Method, path: &str) -> Option<&'a RateLimiter> {
    if !path.starts_with("/api/") {
        return None;
    }
    if method == Method::POST && path.trim_end_matches('/') == BOOKING_PATH {
        Some(&state.appointment_limiter)
    } else {
        Some(&state.api_limiter)
    }
}

/// Reject over-limit clients with 429 before the request reaches a handler.
pub async fn throttle(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(limiter) = limiter_for(&state, req.method(), req.uri().path()) else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip::resolve(req.headers(), peer);

    if let Err(retry_after_secs) = limiter.check(&ip, Instant::now()) {
        tracing::warn!(
            ip = %ip,
            method = %req.method(),
            path = %req.uri().path(),
            retry_after_secs,
            "Rate limit exceeded"
        );
        return AppError::TooManyRequests { retry_after_secs }.into_response();
    }

    next.run(req).await
}
