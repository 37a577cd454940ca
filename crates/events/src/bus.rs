//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ShopEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use orta_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const EVENT_APPOINTMENT_CREATED: &str = "appointment.created";
pub const EVENT_APPOINTMENT_UPDATED: &str = "appointment.updated";
pub const EVENT_APPOINTMENT_CANCELLED: &str = "appointment.cancelled";
pub const EVENT_NOTIFICATION_FAILED: &str = "notification.failed";

// ---------------------------------------------------------------------------
// ShopEvent
// ---------------------------------------------------------------------------

/// A domain event raised by the booking flow or the notification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopEvent {
    /// Dot-separated event name, e.g. `"appointment.created"`.
    pub event_type: String,

    pub appointment_id: Option<DbId>,

    pub notification_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ShopEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            appointment_id: None,
            notification_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_appointment(mut self, appointment_id: DbId) -> Self {
        self.appointment_id = Some(appointment_id);
        self
    }

    pub fn with_notification(mut self, notification_id: DbId) -> Self {
        self.notification_id = Some(notification_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ShopEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ShopEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ShopEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShopEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_appointment_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            ShopEvent::new(EVENT_APPOINTMENT_CREATED)
                .with_appointment(42)
                .with_payload(serde_json::json!({"date": "2030-06-03"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "appointment.created");
        assert_eq!(received.appointment_id, Some(42));
        assert!(received.notification_id.is_none());
        assert_eq!(received.payload["date"], "2030-06-03");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ShopEvent::new(EVENT_NOTIFICATION_FAILED).with_notification(7));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.notification_id, Some(7));
        assert_eq!(e2.event_type, "notification.failed");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(ShopEvent::new(EVENT_APPOINTMENT_CANCELLED));
    }
}
