//! Reactions to domain events raised by the booking flow.
//!
//! The [`BookingListener`] subscribes to the event bus and keeps derived
//! state (reminder schedules) consistent with appointment changes.

pub mod listener;

pub use listener::BookingListener;
