//! Service configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `SENSOR_API__`-prefixed environment variables
//! (`SENSOR_API__DATABASE__URL=sqlite://other.db`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use storage::DatabaseConfig;

/// Config file read when `SENSOR_API_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "sensor-api.toml";

const ENV_PREFIX: &str = "SENSOR_API";

/// Top-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    pub bind_addr: String,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `api=debug,storage=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Settings {
    /// Load settings from the default file location and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SENSOR_API_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(&path, environment())
    }

    /// Load settings from an explicit file path and environment source
    pub fn from_sources(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let defaults = DatabaseConfig::default();

        Config::builder()
            .set_default("server.bind_addr", "0.0.0.0:8080")?
            .set_default("database.url", defaults.url)?
            .set_default("database.max_connections", i64::from(defaults.max_connections))?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

/// Environment source for `SENSOR_API__SECTION__KEY` variables
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "does-not-exist/sensor-api.toml";

    #[test]
    fn test_defaults() {
        let settings =
            Settings::from_sources(MISSING_FILE, environment().source(Some(config::Map::new())))
                .unwrap();

        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.database.url, "sqlite://sensors.db");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_environment_overrides() {
        let mut vars = config::Map::new();
        vars.insert("SENSOR_API__SERVER__BIND_ADDR".to_string(), "127.0.0.1:9000".to_string());
        vars.insert("SENSOR_API__DATABASE__MAX_CONNECTIONS".to_string(), "2".to_string());
        vars.insert("SENSOR_API__LOGGING__JSON".to_string(), "true".to_string());

        let settings =
            Settings::from_sources(MISSING_FILE, environment().source(Some(vars))).unwrap();

        assert_eq!(settings.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(settings.database.max_connections, 2);
        assert!(settings.logging.json);
        assert_eq!(settings.database.url, "sqlite://sensors.db");
    }
}
