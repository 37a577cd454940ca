use std::sync::Arc;

use orta_core::security::RateLimiter;
use orta_events::{EventBus, NotificationDispatcher};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: orta_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Domain events (bookings, delivery failures).
    pub event_bus: Arc<EventBus>,
    /// Sends notifications over the configured channels.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Per-IP limit on public booking submissions.
    pub appointment_limiter: Arc<RateLimiter>,
    /// Per-IP limit on every other `/api/` request.
    pub api_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble state around an existing dispatcher and bus.
    pub fn new(
        pool: orta_db::DbPool,
        config: ServerConfig,
        event_bus: Arc<EventBus>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        let window = config.rate_limit.window();
        let appointment_limiter = Arc::new(RateLimiter::new(
            config.rate_limit.appointments_per_window,
            window,
        ));
        let api_limiter = Arc::new(RateLimiter::new(config.rate_limit.api_per_window, window));
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            dispatcher,
            appointment_limiter,
            api_limiter,
        }
    }
}
