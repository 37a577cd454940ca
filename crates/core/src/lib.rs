//! Domain logic for the Orta Novias booking backend.
//!
//! Everything here is pure: no database, network or clock access. Callers
//! pass `today`/`now` explicitly so rules stay testable.

pub mod analytics;
pub mod appointment;
pub mod business_hours;
pub mod channels;
pub mod error;
pub mod messages;
pub mod pagination;
pub mod phone;
pub mod reminders;
pub mod roles;
pub mod security;
pub mod seo;
pub mod types;
pub mod validation;
