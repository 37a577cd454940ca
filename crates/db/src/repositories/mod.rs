//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod appointment_repo;
pub mod dress_repo;
pub mod email_template_repo;
pub mod notification_repo;
pub mod reminder_repo;
pub mod session_repo;
pub mod testimonial_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use appointment_repo::AppointmentRepo;
pub use dress_repo::DressRepo;
pub use email_template_repo::EmailTemplateRepo;
pub use notification_repo::NotificationRepo;
pub use reminder_repo::ReminderRepo;
pub use session_repo::SessionRepo;
pub use testimonial_repo::TestimonialRepo;
pub use user_repo::UserRepo;
