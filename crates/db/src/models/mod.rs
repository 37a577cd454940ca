//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod analytics;
pub mod appointment;
pub mod dress;
pub mod email_template;
pub mod notification;
pub mod reminder;
pub mod session;
pub mod testimonial;
pub mod user;
