//! Appointment status and confirmation-method constants.

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All accepted appointment statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_CONFIRMED, STATUS_CANCELLED];

/// The bride asked to be contacted on WhatsApp.
pub const METHOD_WHATSAPP: &str = "whatsapp";

/// The bride asked to be contacted by email.
pub const METHOD_EMAIL: &str = "email";

/// All accepted confirmation methods.
pub const VALID_METHODS: &[&str] = &[METHOD_WHATSAPP, METHOD_EMAIL];

/// Check whether `value` is a known appointment status.
pub fn is_valid_status(value: &str) -> bool {
    VALID_STATUSES.contains(&value)
}

/// Check whether `value` is a known confirmation method.
pub fn is_valid_method(value: &str) -> bool {
    VALID_METHODS.contains(&value)
}
