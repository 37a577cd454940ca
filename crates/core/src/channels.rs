//! Well-known notification type and status constants.
//!
//! These must match the values stored in `notifications.notification_type`
//! and `notifications.status` and referenced by the dispatcher and the
//! notification handlers.

/// Notification delivered by SMTP email.
pub const CHANNEL_EMAIL: &str = "email";

/// Notification delivered by WhatsApp (Twilio or Meta Cloud API).
pub const CHANNEL_WHATSAPP: &str = "whatsapp";

/// Notification stored for the back-office only. Never leaves the system.
pub const CHANNEL_INTERNAL: &str = "internal";

/// Browser push notification. Stored and marked sent like `internal`.
pub const CHANNEL_PUSH: &str = "push";

/// All accepted notification types.
pub const VALID_CHANNELS: &[&str] = &[CHANNEL_EMAIL, CHANNEL_WHATSAPP, CHANNEL_INTERNAL, CHANNEL_PUSH];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_READ: &str = "read";

/// All accepted notification statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_SENT, STATUS_FAILED, STATUS_READ];

/// Default number of delivery attempts before a notification is left failed.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Check whether `value` is a known notification type.
pub fn is_valid_channel(value: &str) -> bool {
    VALID_CHANNELS.contains(&value)
}

/// Check whether `value` is a known notification status.
pub fn is_valid_status(value: &str) -> bool {
    VALID_STATUSES.contains(&value)
}
