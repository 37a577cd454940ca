use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orta_events::{EventBus, NotificationDispatcher};
use orta_worker::cli::{Cli, Commands};
use orta_worker::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orta_worker=debug,orta_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = orta_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    orta_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    let bus = Arc::new(EventBus::default());
    let dispatcher = Arc::new(NotificationDispatcher::from_env(pool, bus));

    let outcome = match cli.command() {
        Commands::SendReminders {
            hours_ahead,
            dry_run,
        } => commands::send_reminders(dispatcher, *hours_ahead, *dry_run)
            .await
            .map(|_| ()),
        Commands::RetryNotifications => commands::retry_notifications(dispatcher)
            .await
            .map(|_| ()),
        Commands::Run => {
            let shutdown_timeout = Duration::from_secs(
                std::env::var("SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            );
            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
                tracing::info!("Shutdown signal received");
                signal_cancel.cancel();
            });
            commands::run(dispatcher, cancel, shutdown_timeout).await;
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Worker command failed");
        std::process::exit(1);
    }
    tracing::info!("Worker finished");
}
