//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use gambit_shared::constants::DEFAULT_MAX_ACTIVE_GAMES;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite record store.
    /// Env: `DB_PATH`
    /// Default: `./data/gambit.db`
    pub db_path: PathBuf,

    /// Ceiling on concurrently active games; matchmaking reports `full`
    /// above it.
    /// Env: `MAX_ACTIVE_GAMES`
    /// Default: `50`
    pub max_active_games: usize,

    /// Seconds between abandonment sweeps over ongoing games.
    /// Env: `SWEEP_INTERVAL_SECS`
    /// Default: `30`
    pub sweep_interval_secs: u64,

    /// Human-readable name for this server instance.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Gambit Server"`
    pub instance_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            db_path: PathBuf::from("./data/gambit.db"),
            max_active_games: DEFAULT_MAX_ACTIVE_GAMES,
            sweep_interval_secs: 30,
            instance_name: "Gambit Server".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(val) = std::env::var("MAX_ACTIVE_GAMES") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_active_games = n;
            } else {
                tracing::warn!(value = %val, "Invalid MAX_ACTIVE_GAMES, using default");
            }
        }

        if let Ok(val) = std::env::var("SWEEP_INTERVAL_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.sweep_interval_secs = n;
            }
        }

        if let Ok(name) = std::env::var("INSTANCE_NAME") {
            config.instance_name = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
