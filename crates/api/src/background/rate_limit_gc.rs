//! Periodic pruning of expired rate-limit counters.

use std::sync::Arc;
use std::time::{Duration, Instant};

use orta_core::security::RateLimiter;
use tokio_util::sync::CancellationToken;

/// How often expired counters are dropped.
const GC_INTERVAL: Duration = Duration::from_secs(60);

/// Drop per-IP entries whose window has passed, until `cancel` fires.
pub async fn run(limiters: Vec<Arc<RateLimiter>>, cancel: CancellationToken) {
    tracing::debug!(interval_secs = GC_INTERVAL.as_secs(), "Rate limit GC started");
    let mut interval = tokio::time::interval(GC_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limit GC stopping");
                break;
            }
            _ = interval.tick() => {
                let now = Instant::now();
                for limiter in &limiters {
                    limiter.retain_recent(now);
                }
                let tracked: usize = limiters.iter().map(|l| l.tracked_keys()).sum();
                tracing::trace!(tracked, "Rate limit counters pruned");
            }
        }
    }
}
