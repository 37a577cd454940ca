//! Client address resolution.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Used when neither a forwarded header nor a peer address is available.
pub const UNKNOWN_IP: &str = "unknown";

/// First `X-Forwarded-For` entry, else the peer address.
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Best-effort client IP, for logging, throttling and analytics.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl ClientIp {
    /// `None` when the address could not be determined.
    pub fn known(&self) -> Option<String> {
        (self.0 != UNKNOWN_IP).then(|| self.0.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(resolve(&parts.headers, peer)))
    }
}
