//! Event bus and notification delivery for the Orta Novias backend.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`delivery`]: outbound channels (SMTP email, WhatsApp).
//! - [`NotificationDispatcher`]: sends stored notifications and records
//!   the outcome.
//! - [`ReminderScheduler`] and [`RetryScheduler`]: periodic jobs shared by
//!   the API server and the worker.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod reminders;
pub mod retry;

pub use bus::{EventBus, ShopEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};
pub use delivery::{DeliveryChannel, DeliveryError, OutboundMessage};
pub use dispatcher::{DispatchError, NotificationDispatcher};
pub use reminders::{ReminderScheduler, SweepReport};
pub use retry::RetryScheduler;
