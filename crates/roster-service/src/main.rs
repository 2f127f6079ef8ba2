//! Roster Service
//!
//! Runs the roster core behind the console transport.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment and install the log subscriber
//! 2. Pick the admin store: Postgres when `DATABASE_URL` is set, in-memory otherwise
//! 3. Apply pending migrations (Postgres only, failure is not fatal)
//! 4. Spawn `RosterManagerActor` (loads admins from the store)
//! 5. Serve stdin lines through `CommandDispatcher`
//! 6. Wait for EOF or a shutdown signal

#![warn(clippy::pedantic)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::secret::ExposeSecret;
use roster_service::actors::RosterManagerActor;
use roster_service::commands::CommandDispatcher;
use roster_service::config::{Config, LogFormat};
use roster_service::console;
use roster_service::store::{AdminStore, InMemoryAdminStore, PgAdminStore};
use tokio::io::BufReader;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Postgres connection acquire timeout.
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first; it picks the log format
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing. Both layers write to stderr; stdout carries replies.
    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_service=debug,roster=debug".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!("Starting Roster Service");

    info!(
        capacity = config.default_event.capacity,
        seed_handles = config.super_admins.handles.len(),
        seed_ids = config.super_admins.ids.len(),
        persistent_admins = config.database_url.is_some(),
        "Configuration loaded successfully"
    );

    let store = build_store(&config).await?;

    let shutdown_token = CancellationToken::new();

    let (roster, actor_task) = RosterManagerActor::spawn(
        config.manager_settings(),
        store,
        shutdown_token.child_token(),
    )
    .await;
    info!("Roster manager started");

    let dispatcher = CommandDispatcher::new(roster.clone());

    // Stop the console loop on Ctrl+C / SIGTERM
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, initiating graceful shutdown...");
        signal_token.cancel();
    });

    info!("Roster Service running - reading commands from stdin");
    console::run(
        &dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown_token.child_token(),
    )
    .await
    .context("console transport failed")?;

    shutdown_token.cancel();
    if let Err(e) = actor_task.await {
        warn!(error = %e, "Roster manager task ended abnormally");
    }

    info!("Roster Service shutdown complete");
    Ok(())
}

/// Postgres store when a database is configured, in-memory store otherwise.
///
/// The pool connects lazily so an unreachable database degrades to "no
/// persisted admins" instead of failing startup.
async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn AdminStore>> {
    let Some(database_url) = &config.database_url else {
        info!("DATABASE_URL not set, using in-memory admin store");
        return Ok(Arc::new(InMemoryAdminStore::new()));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_lazy(database_url.expose_secret())
        .context("invalid DATABASE_URL")?;

    match sqlx::migrate!("../../migrations").run(&pool).await {
        Ok(()) => info!("Database migrations applied"),
        Err(e) => warn!(error = %e, "Could not apply migrations, admin store may be unavailable"),
    }

    Ok(Arc::new(PgAdminStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
