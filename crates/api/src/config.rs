use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background jobs get to finish after shutdown starts.
    pub shutdown_timeout_secs: u64,
    /// Public site root used in sitemap, robots.txt and structured data.
    pub site_url: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `SITE_URL`             | `https://ortanovias.com`   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs = env_or("SHUTDOWN_TIMEOUT_SECS", 30);

        let site_url =
            std::env::var("SITE_URL").unwrap_or_else(|_| "https://ortanovias.com".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            site_url,
            jwt: JwtConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

/// Request throttling and login lockout settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Bookings allowed per client IP per window.
    pub appointments_per_window: u32,
    /// Other `/api/` requests allowed per client IP per window.
    pub api_per_window: u32,
    pub window_secs: u64,
    /// Consecutive failed logins before the account is locked.
    pub login_max_attempts: i32,
    pub login_lockout_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            appointments_per_window: 5,
            api_per_window: 50,
            window_secs: 300,
            login_max_attempts: 5,
            login_lockout_secs: 900,
        }
    }
}

impl RateLimitConfig {
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `RATE_LIMIT_APPOINTMENTS` | `5`     |
    /// | `RATE_LIMIT_API`          | `50`    |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `300`   |
    /// | `LOGIN_MAX_ATTEMPTS`      | `5`     |
    /// | `LOGIN_LOCKOUT_SECS`      | `900`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            appointments_per_window: env_or(
                "RATE_LIMIT_APPOINTMENTS",
                defaults.appointments_per_window,
            ),
            api_per_window: env_or("RATE_LIMIT_API", defaults.api_per_window),
            window_secs: env_or("RATE_LIMIT_WINDOW_SECS", defaults.window_secs),
            login_max_attempts: env_or("LOGIN_MAX_ATTEMPTS", defaults.login_max_attempts),
            login_lockout_secs: env_or("LOGIN_LOCKOUT_SECS", defaults.login_lockout_secs),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Parse an env var, falling back to `default` when unset.
///
/// Panics on a present but unparsable value so misconfiguration fails at startup.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e:?}")),
        Err(_) => default,
    }
}
