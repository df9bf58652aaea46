//! # gambit-server
//!
//! Coordination server for live two-player chess:
//! - **Accounts & presence**: registration with race-safe username claims,
//!   guest bootstrap, heartbeat-derived online status
//! - **Matchmaking**: FIFO queue with admission control and one-shot match
//!   mailboxes for polling clients
//! - **Game sessions**: turn-enforced moves validated by the rules engine,
//!   chat, the draw-offer protocol, abandonment forfeits, and stat/history
//!   settlement
//! - **REST API** (axum) binding every operation to a route
//!
//! State lives in a SQLite-backed record store; each entity key mutates
//! under its own lock, so unrelated games never contend.

mod api;
mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gambit_core::{Coordinator, CoordinatorConfig};
use gambit_rules::StandardRules;
use gambit_store::RecordStore;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gambit_server=debug")),
        )
        .init();

    info!("Starting Gambit server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let store = RecordStore::open(&config.db_path)?;

    let coordinator = Arc::new(Coordinator::new(
        store,
        Arc::new(StandardRules::new()),
        CoordinatorConfig {
            max_active_games: config.max_active_games,
        },
    ));

    let app_state = AppState {
        coordinator: coordinator.clone(),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Abandonment sweep: forfeit ongoing games whose players went silent.
    let sweeper = coordinator.clone();
    let sweep_interval = Duration::from_secs(config.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            if let Err(e) = sweeper.sweep_abandoned().await {
                tracing::warn!(error = %e, "abandonment sweep failed");
            }
        }
    });

    // Periodic key-lock registry cleanup (every 5 minutes).
    let purger = coordinator.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            purger.entities().purge_idle_locks().await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
