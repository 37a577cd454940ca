//! Periodic retry of failed notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::dispatcher::NotificationDispatcher;

/// How often failed notifications are retried.
const RETRY_INTERVAL: Duration = Duration::from_secs(600);

pub struct RetryScheduler {
    dispatcher: Arc<NotificationDispatcher>,
}

impl RetryScheduler {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Retry every ten minutes until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(RETRY_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification retry scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.dispatcher.retry_failed().await {
                        tracing::error!(error = %e, "Failed to retry notifications");
                    }
                }
            }
        }
    }
}
