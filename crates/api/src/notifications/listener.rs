//! Event bus subscriber for appointment and delivery events.

use orta_db::repositories::ReminderRepo;
use orta_db::DbPool;
use orta_events::bus::{EVENT_APPOINTMENT_CANCELLED, EVENT_NOTIFICATION_FAILED};
use orta_events::ShopEvent;
use tokio::sync::broadcast;

/// Applies side effects of [`ShopEvent`]s.
///
/// A cancelled appointment loses its unsent reminders; failed deliveries
/// are surfaced in the logs for the back office.
pub struct BookingListener {
    pool: DbPool,
}

impl BookingListener {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<ShopEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to handle event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Booking listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, booking listener shutting down");
                    break;
                }
            }
        }
    }

    /// Handle a single event.
    pub async fn handle(&self, event: &ShopEvent) -> Result<(), sqlx::Error> {
        match event.event_type.as_str() {
            EVENT_APPOINTMENT_CANCELLED => {
                let Some(appointment_id) = event.appointment_id else {
                    return Ok(());
                };
                let removed =
                    ReminderRepo::delete_unsent_for_appointment(&self.pool, appointment_id)
                        .await?;
                tracing::info!(
                    appointment_id,
                    removed,
                    "Reminders dropped for cancelled appointment"
                );
            }
            EVENT_NOTIFICATION_FAILED => {
                let error = event
                    .payload
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                tracing::warn!(
                    notification_id = ?event.notification_id,
                    appointment_id = ?event.appointment_id,
                    error,
                    "Notification delivery failed"
                );
            }
            other => {
                tracing::debug!(
                    event_type = other,
                    appointment_id = ?event.appointment_id,
                    "Event observed"
                );
            }
        }
        Ok(())
    }
}
