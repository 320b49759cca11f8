//! Server Configuration
//!
//! Defaults plus environment overrides for the WebSocket server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::game::config::GameConfig;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// How often the scan ticker polls the session.
    pub scan_poll_interval: Duration,
    /// Snippet library file. The built-in library is used when unset.
    pub snippet_path: Option<PathBuf>,
    /// Fixed RNG seed. Seeded from entropy when unset.
    pub seed: Option<u64>,
    /// Game tuning.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_connections: 1000,
            scan_poll_interval: Duration::from_millis(500),
            snippet_path: None,
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = parse_var(&lookup, "BUG_HUNT_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(max) = parse_var(&lookup, "BUG_HUNT_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "BUG_HUNT_SCAN_POLL_MS")? {
            if ms == 0 {
                return Err(invalid("BUG_HUNT_SCAN_POLL_MS", "0"));
            }
            config.scan_poll_interval = Duration::from_millis(ms);
        }
        if let Some(path) = lookup("BUG_HUNT_SNIPPETS").filter(|p| !p.trim().is_empty()) {
            config.snippet_path = Some(PathBuf::from(path));
        }
        if let Some(columns) = parse_var::<i32, _>(&lookup, "BUG_HUNT_MAX_COLUMNS")? {
            if columns < 1 {
                return Err(invalid("BUG_HUNT_MAX_COLUMNS", &columns.to_string()));
            }
            config.game.max_columns_per_line = columns;
        }
        if let Some(capacity) = parse_var::<usize, _>(&lookup, "BUG_HUNT_LEADERBOARD_CAPACITY")? {
            if capacity == 0 {
                return Err(invalid("BUG_HUNT_LEADERBOARD_CAPACITY", "0"));
            }
            config.game.leaderboard_capacity = capacity;
        }
        if let Some(seed) = parse_var(&lookup, "BUG_HUNT_SEED")? {
            config.seed = Some(seed);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &raw)),
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue { key, value: value.to_string() }
}
