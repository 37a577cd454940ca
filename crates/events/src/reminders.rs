//! Reminder sweep.
//!
//! [`ReminderScheduler`] periodically sends reminders that fall inside the
//! sweep window, marks them sent and purges old sent reminders.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use orta_core::reminders::{reminder_window, SENT_RETENTION_DAYS};
use orta_core::types::Timestamp;
use orta_db::models::reminder::DueReminder;
use orta_db::repositories::ReminderRepo;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::{DispatchError, NotificationDispatcher};

/// How often the background sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Lookahead of the periodic sweep, in hours.
pub const DEFAULT_HOURS_AHEAD: i64 = 1;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    pub purged: u64,
}

pub struct ReminderScheduler {
    dispatcher: Arc<NotificationDispatcher>,
}

impl ReminderScheduler {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Run the sweep every five minutes until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep(Utc::now(), DEFAULT_HOURS_AHEAD).await {
                        Ok(report) if report.due > 0 || report.purged > 0 => {
                            tracing::info!(
                                due = report.due,
                                sent = report.sent,
                                failed = report.failed,
                                purged = report.purged,
                                "Reminder sweep finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Reminder sweep failed"),
                    }
                }
            }
        }
    }

    /// Reminders the sweep at `now` would send.
    pub async fn due(
        &self,
        now: Timestamp,
        hours_ahead: i64,
    ) -> Result<Vec<DueReminder>, DispatchError> {
        let (from, to) = reminder_window(now, hours_ahead);
        Ok(ReminderRepo::list_due(self.dispatcher.pool(), from, to).await?)
    }

    /// Send every due reminder, mark each one sent, then purge old ones.
    ///
    /// A reminder whose delivery fails is still marked sent; its
    /// notification stays `failed` and is picked up by the retry job.
    pub async fn sweep(&self, now: Timestamp, hours_ahead: i64) -> Result<SweepReport, DispatchError> {
        let pool = self.dispatcher.pool();
        let due = self.due(now, hours_ahead).await?;
        let mut report = SweepReport {
            due: due.len(),
            ..Default::default()
        };

        for reminder in &due {
            match self.dispatcher.send_reminder(reminder).await {
                Ok(true) => report.sent += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(reminder_id = reminder.id, error = %e, "Failed to send reminder");
                    continue;
                }
            }
            ReminderRepo::mark_sent(pool, reminder.id).await?;
        }

        let cutoff = now - chrono::Duration::days(SENT_RETENTION_DAYS);
        report.purged = ReminderRepo::delete_sent_before(pool, cutoff).await?;
        Ok(report)
    }
}
