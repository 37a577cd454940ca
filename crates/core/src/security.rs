//! Request screening and keyed rate limiting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Fragments that mark a request as a likely probe or injection attempt.
pub const SUSPICIOUS_PATTERNS: &[&str] = &[
    "union select",
    "drop table",
    "insert into",
    "delete from",
    "script>",
    "<iframe",
    "javascript:",
    "../",
    "/etc/passwd",
    "cmd.exe",
    "eval(",
];

/// Whether the request path/query or user agent matches a suspicious pattern.
///
/// Matching is case-insensitive. Percent-encoded spaces (`%20`) and `+` are
/// treated as spaces so that encoded SQL keywords are still caught.
pub fn is_suspicious(path_and_query: &str, user_agent: &str) -> bool {
    let target = path_and_query
        .to_lowercase()
        .replace("%20", " ")
        .replace('+', " ");
    let agent = user_agent.to_lowercase();
    SUSPICIOUS_PATTERNS
        .iter()
        .any(|p| target.contains(p) || agent.contains(p))
}

// ---------------------------------------------------------------------------
// Rate limiter
// ---------------------------------------------------------------------------

/// Allows `max_requests` per `window` for each key (usually a client IP).
///
/// Sliding-window log: every accepted request is timestamped and a request
/// is refused while `max_requests` timestamps fall inside the trailing
/// `window`.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1) as usize,
            window,
            hits: DashMap::new(),
        }
    }

    /// Record a request for `key` at `now`.
    ///
    /// Returns `Err(retry_after_secs)` when the key is over its allowance;
    /// refused requests are not recorded.
    pub fn check(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut entry = self.hits.entry(key.to_string()).or_default();
        let hits = entry.value_mut();
        while hits
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() >= self.max_requests {
            let oldest = hits.front().copied().unwrap_or(now);
            let wait = self
                .window
                .saturating_sub(now.saturating_duration_since(oldest));
            return Err(wait.as_secs_f64().ceil().max(1.0) as u64);
        }

        hits.push_back(now);
        Ok(())
    }

    /// Drop keys with no request inside the window ending at `now`.
    pub fn retain_recent(&self, now: Instant) {
        self.hits.retain(|_, hits| {
            hits.back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}
