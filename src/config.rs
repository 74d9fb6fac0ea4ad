//! Server configuration from environment variables

use crate::types::RoomConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Rooms untouched for this long are evicted
    pub room_idle_ttl: Duration,
    pub sweep_interval: Duration,
    pub room: RoomConfig,
    pub secret_catalog_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 6574)),
            room_idle_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            room: RoomConfig::default(),
            secret_catalog_path: None,
        }
    }
}

/// Parse an env var, warning and falling back to `default` if it's garbage
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env_or("IMPOSTOR_BIND_ADDR", defaults.bind_addr);
        let room_idle_ttl = Duration::from_secs(
            env_or("ROOM_IDLE_TTL_SECS", defaults.room_idle_ttl.as_secs()).max(1),
        );
        let sweep_interval = Duration::from_secs(
            env_or(
                "ROOM_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval.as_secs(),
            )
            .max(1),
        );

        let room = RoomConfig {
            max_room_capacity: env_or("MAX_ROOM_CAPACITY", defaults.room.max_room_capacity)
                .max(1),
            max_name_chars: env_or("MAX_NAME_CHARS", defaults.room.max_name_chars).max(1),
            max_clue_chars: env_or("MAX_CLUE_CHARS", defaults.room.max_clue_chars).max(1),
        };

        let secret_catalog_path = std::env::var("SECRET_CATALOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        tracing::info!(
            %bind_addr,
            idle_ttl_secs = room_idle_ttl.as_secs(),
            sweep_secs = sweep_interval.as_secs(),
            max_room_capacity = room.max_room_capacity,
            "Server config loaded"
        );

        Self {
            bind_addr,
            room_idle_ttl,
            sweep_interval,
            room,
            secret_catalog_path,
        }
    }
}
