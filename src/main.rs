// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car Catalog API Server
//!
//! Serves user registration/login and a car model catalog mirrored from an
//! upstream REST API on a schedule.

use car_catalog::{
    config::Config,
    db::Database,
    services::{CarApiClient, MemorySessionStore},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Car Catalog API");

    // Open database and create schema
    let db = Database::connect(&config.database_url).await?;
    tracing::info!(cars = db.count_cars().await?, "Database ready");

    let car_api = CarApiClient::new(&config)?;
    tracing::info!(url = %config.car_api_url, "Car API client initialized");

    let session_ttl = Duration::from_secs(config.session_ttl_secs);
    let sessions = Arc::new(MemorySessionStore::new(session_ttl));

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        db,
        Arc::new(car_api),
        sessions.clone(),
    ));

    // Background work: periodic sync and session cleanup
    let mut background = Vec::new();
    if config.sync_interval_secs > 0 {
        let interval = Duration::from_secs(config.sync_interval_secs);
        tracing::info!(interval_secs = config.sync_interval_secs, "Sync scheduler enabled");
        background.push(state.sync.spawn_scheduler(interval));
    } else {
        tracing::info!("Sync scheduler disabled");
    }
    background.push(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(session_ttl.max(Duration::from_secs(60)));
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(
                    purged,
                    active = sessions.active_count(),
                    "Purged expired sessions"
                );
            }
        }
    }));

    // Build router
    let app = car_catalog::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for task in background {
        task.abort();
    }
    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("car_catalog=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
