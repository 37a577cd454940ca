//! Outbound delivery channels: SMTP email and WhatsApp.
//!
//! Both implement [`DeliveryChannel`] so the dispatcher can treat them
//! uniformly and tests can substitute a fake.

use async_trait::async_trait;

pub mod email;
pub mod whatsapp;

use email::EmailError;
use whatsapp::WhatsAppError;

/// A message ready to hand to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Email address or phone number.
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Optional HTML alternative for email.
    pub html: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    WhatsApp(#[from] WhatsAppError),

    /// Anything else a channel implementation wants to report.
    #[error("{0}")]
    Other(String),
}

/// A transport that can deliver an [`OutboundMessage`].
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver the message, returning the provider's message id when it gives one.
    async fn send(&self, message: &OutboundMessage) -> Result<Option<String>, DeliveryError>;
}
