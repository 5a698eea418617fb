//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::level::LevelOptions;
use crate::game::GameConfig;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Simulation ticks per second
    pub tick_rate: u32,
    pub game: GameConfig,

    /// Level catalog file; no file means an arena without walls
    pub level_path: Option<PathBuf>,
    /// Level to pick from the catalog
    pub level_name: String,
    pub level: LevelOptions,

    /// Allowed client origins for CORS, comma-separated; unset allows any
    pub client_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match get("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => get("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8888".to_string()),
        };

        let tick_rate: u32 = parse_or(&get, "TICK_RATE", 30)?;
        if tick_rate == 0 {
            return Err(ConfigError::Invalid("TICK_RATE", "0".to_string()));
        }

        let anchored_spawns = match get("SPAWN_MODE").as_deref() {
            None | Some("anchored") => true,
            Some("random") => false,
            Some(other) => return Err(ConfigError::Invalid("SPAWN_MODE", other.to_string())),
        };

        let defaults = GameConfig::default();
        let game = GameConfig {
            shot_cooldown_ms: parse_or(&get, "SHOT_COOLDOWN_MS", defaults.shot_cooldown_ms)?,
            max_spawn_attempts: parse_or(&get, "MAX_SPAWN_ATTEMPTS", defaults.max_spawn_attempts)?,
            purge_projectiles_on_leave: parse_or(
                &get,
                "PURGE_PROJECTILES_ON_LEAVE",
                defaults.purge_projectiles_on_leave,
            )?,
            anchored_spawns,
            ..defaults
        };

        let level_defaults = LevelOptions::default();
        let level = LevelOptions {
            wall_layer: get("WALL_LAYER").unwrap_or(level_defaults.wall_layer),
            pixel_size: parse_or(&get, "LEVEL_PIXEL_SIZE", level_defaults.pixel_size)?,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr))?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            tick_rate,
            game,
            level_path: get("LEVEL_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
            level_name: get("LEVEL_NAME").unwrap_or_else(|| "Castle".to_string()),
            level,
            client_origin: get("CLIENT_ORIGIN").filter(|o| !o.trim().is_empty()),
        })
    }
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8888".parse::<SocketAddr>().unwrap());
        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.game.shot_cooldown_ms, 2000);
        assert!(config.game.anchored_spawns);
        assert_eq!(config.level_path, None);
        assert_eq!(config.level_name, "Castle");
        assert_eq!(config.level.wall_layer, "CastleBorder");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("SHOT_COOLDOWN_MS", "1000"),
            ("SPAWN_MODE", "random"),
            ("LEVEL_PATH", "levels.json"),
            ("LEVEL_PIXEL_SIZE", "1024"),
        ])
        .unwrap();
        assert_eq!(config.server_addr.port(), 9000);
        assert_eq!(config.game.shot_cooldown_ms, 1000);
        assert!(!config.game.anchored_spawns);
        assert_eq!(config.level_path, Some(PathBuf::from("levels.json")));
        assert_eq!(config.level.pixel_size, 1024.0);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("TICK_RATE", "fast")]),
            Err(ConfigError::Invalid("TICK_RATE", _))
        ));
        assert!(matches!(load(&[("TICK_RATE", "0")]), Err(ConfigError::Invalid("TICK_RATE", _))));
        assert!(matches!(
            load(&[("SPAWN_MODE", "corners")]),
            Err(ConfigError::Invalid("SPAWN_MODE", _))
        ));
        assert!(matches!(
            load(&[("SERVER_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddress(_))
        ));
    }
}
