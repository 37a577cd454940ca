//! Request handlers, one module per resource.
//!
//! Handlers delegate persistence to the repositories in `orta_db` and map
//! errors via [`AppError`](crate::error::AppError).

pub mod analytics;
pub mod appointments;
pub mod auth;
pub mod dresses;
pub mod email_templates;
pub mod notifications;
pub mod reminders;
pub mod root;
pub mod seo;
pub mod testimonials;
pub mod users;
