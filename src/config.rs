use crate::core::db::{EngineConfig, DEFAULT_DB_PATH};
use crate::core::{Result, TellusError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tellus.toml";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Store-related configuration.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub foreign_keys: Option<bool>,
    pub busy_timeout_ms: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. "tellus=debug"
    pub filter: Option<String>,
}

impl Config {
    /// Engine settings, falling back to defaults for anything unset.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let Some(db) = &self.database else {
            return defaults;
        };
        EngineConfig {
            db_path: db
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            foreign_keys: db.foreign_keys.unwrap_or(defaults.foreign_keys),
            busy_timeout: db
                .busy_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.busy_timeout),
        }
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref()?.filter.as_deref()
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = tellus::config::load_config("tellus.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| TellusError::Config(format!("{}: {}", path.display(), e)))
}

/// Resolves the configuration to use.
///
/// An explicit path must exist. Otherwise `tellus.toml` in the working
/// directory is tried, then `<config dir>/tellus/config.toml`, then defaults.
pub fn discover_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("tellus").join("config.toml"));
    }

    for candidate in candidates {
        if candidate.is_file() {
            debug!("Using configuration from {}", candidate.display());
            return load_config(candidate);
        }
    }
    Ok(Config::default())
}
