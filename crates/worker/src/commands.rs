//! Worker commands.
//!
//! The one-shot commands reuse the same scheduler code the API server runs
//! in the background, so a cron entry and the in-process loop behave alike.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use orta_events::{
    DispatchError, NotificationDispatcher, ReminderScheduler, RetryScheduler, SweepReport,
};
use tokio_util::sync::CancellationToken;

/// Send due reminders once.
///
/// With `dry_run` the due reminders are only logged; the report then
/// carries the `due` count and nothing else.
pub async fn send_reminders(
    dispatcher: Arc<NotificationDispatcher>,
    hours_ahead: i64,
    dry_run: bool,
) -> Result<SweepReport, DispatchError> {
    let scheduler = ReminderScheduler::new(dispatcher);
    let now = Utc::now();

    if dry_run {
        let due = scheduler.due(now, hours_ahead).await?;
        for reminder in &due {
            tracing::info!(
                reminder_id = reminder.id,
                appointment_id = reminder.appointment_id,
                reminder_type = %reminder.reminder_type,
                scheduled_time = %reminder.scheduled_time,
                name = %reminder.name,
                "Reminder due (dry run)"
            );
        }
        return Ok(SweepReport {
            due: due.len(),
            ..Default::default()
        });
    }

    let report = scheduler.sweep(now, hours_ahead).await?;
    tracing::info!(
        due = report.due,
        sent = report.sent,
        failed = report.failed,
        purged = report.purged,
        "Reminder run finished"
    );
    Ok(report)
}

/// Retry failed notifications once. Returns how many were delivered.
pub async fn retry_notifications(
    dispatcher: Arc<NotificationDispatcher>,
) -> Result<usize, DispatchError> {
    let sent = dispatcher.retry_failed().await?;
    tracing::info!(sent, "Notification retry finished");
    Ok(sent)
}

/// Run both schedulers until `cancel` fires, then wait up to
/// `shutdown_timeout` for each to stop.
pub async fn run(
    dispatcher: Arc<NotificationDispatcher>,
    cancel: CancellationToken,
    shutdown_timeout: Duration,
) {
    let reminders = ReminderScheduler::new(Arc::clone(&dispatcher));
    let reminder_cancel = cancel.clone();
    let reminder_handle = tokio::spawn(async move { reminders.run(reminder_cancel).await });

    let retries = RetryScheduler::new(dispatcher);
    let retry_cancel = cancel.clone();
    let retry_handle = tokio::spawn(async move { retries.run(retry_cancel).await });

    tracing::info!("Worker schedulers started");
    cancel.cancelled().await;

    for (name, handle) in [("reminders", reminder_handle), ("retries", retry_handle)] {
        match tokio::time::timeout(shutdown_timeout, handle).await {
            Ok(Ok(())) => tracing::debug!(job = name, "Scheduler stopped"),
            Ok(Err(e)) => tracing::error!(job = name, error = %e, "Scheduler task failed"),
            Err(_) => tracing::warn!(job = name, "Scheduler did not stop in time"),
        }
    }
}
