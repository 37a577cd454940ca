use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orta_api::background::rate_limit_gc;
use orta_api::config::ServerConfig;
use orta_api::notifications::BookingListener;
use orta_api::router::build_app_router;
use orta_api::state::AppState;
use orta_events::{EventBus, NotificationDispatcher, ReminderScheduler, RetryScheduler};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orta_api=debug,orta_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = orta_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    orta_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    orta_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus and delivery ---
    let event_bus = Arc::new(EventBus::default());
    let dispatcher = Arc::new(NotificationDispatcher::from_env(
        pool.clone(),
        Arc::clone(&event_bus),
    ));

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState::new(
        pool.clone(),
        config,
        Arc::clone(&event_bus),
        Arc::clone(&dispatcher),
    );

    // --- Background jobs ---
    let cancel = CancellationToken::new();

    let listener_handle = tokio::spawn(BookingListener::new(pool).run(event_bus.subscribe()));

    let reminders = ReminderScheduler::new(Arc::clone(&dispatcher));
    let reminders_cancel = cancel.clone();
    let reminders_handle = tokio::spawn(async move { reminders.run(reminders_cancel).await });

    let retry = RetryScheduler::new(Arc::clone(&dispatcher));
    let retry_cancel = cancel.clone();
    let retry_handle = tokio::spawn(async move { retry.run(retry_cancel).await });

    let gc_handle = tokio::spawn(rate_limit_gc::run(
        vec![
            Arc::clone(&state.appointment_limiter),
            Arc::clone(&state.api_limiter),
        ],
        cancel.clone(),
    ));

    tracing::info!("Background jobs started (booking listener, reminders, retries, rate limit GC)");

    // --- Start server ---
    let app = build_app_router(state);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    for (name, handle) in [
        ("reminder scheduler", reminders_handle),
        ("retry scheduler", retry_handle),
        ("rate limit GC", gc_handle),
    ] {
        if tokio::time::timeout(shutdown_timeout, handle).await.is_err() {
            tracing::warn!(task = name, "Background job did not stop in time");
        }
    }

    // Dropping the last bus handle closes the channel and stops the listener.
    drop(dispatcher);
    drop(event_bus);
    let _ = tokio::time::timeout(shutdown_timeout, listener_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
