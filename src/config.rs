use crate::core::db::ConnectOptions;
use crate::core::{EditorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Top-level configuration structure parsed from a TOML file.
///
/// Every section and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ui: UIConfig,
    pub sqlite: SqliteConfig,
    pub log: LogConfig,
}

/// UI-related configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UIConfig {
    pub color: bool,
    pub max_column_width: usize,
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            color: true,
            max_column_width: 40,
        }
    }
}

/// SQLite-related configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqliteConfig {
    pub foreign_keys: bool,
    pub busy_timeout_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        SqliteConfig {
            foreign_keys: true,
            busy_timeout_ms: 5000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "warn".to_string(),
        }
    }
}

impl LogConfig {
    /// The configured level as a `tracing` level.
    pub fn max_level(&self) -> Result<Level> {
        self.level.trim().parse::<Level>().map_err(|_| {
            EditorError::Config(format!(
                "invalid log level '{}' (expected error, warn, info, debug or trace)",
                self.level
            ))
        })
    }
}

impl SqliteConfig {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            foreign_keys: self.foreign_keys,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = sqledit::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Parses and validates configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.log.max_level()?;
    Ok(config)
}

/// The per-user configuration file, `<config dir>/sqledit/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqledit").join("config.toml"))
}

/// Loads `explicit` if given (it must exist), else the per-user file if it
/// exists, else the defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(path),
        _ => Ok(Config::default()),
    }
}
