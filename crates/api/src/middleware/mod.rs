//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireAuth`] -- role requirements.
//! - [`client_ip::ClientIp`] -- forwarded or peer client address.
//! - [`rate_limit::throttle`] -- per-IP limits on `/api/` routes.
//! - [`security::screen`] -- suspicious-pattern and auth-failure logging.

pub mod auth;
pub mod client_ip;
pub mod rate_limit;
pub mod rbac;
pub mod security;
