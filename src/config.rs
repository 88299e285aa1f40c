//! Configuration handling
//!
//! Manages the `docql.toml` configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `DOCQL_DATABASE` - Logical database name
//! - `DOCQL_PARSE_MODE` - `lenient` or `strict`
//! - `DOCQL_TIMEOUT_MS` - Per-call store timeout in milliseconds
//! - `DOCQL_DATA_FILE` - Default JSON data file for `docql run`
//!
//! These can be set in a `.env` file next to the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docql_core::{CompilerOptions, ParseMode};
use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "docql.toml";

/// Environment variable names
pub const ENV_DATABASE: &str = "DOCQL_DATABASE";
pub const ENV_PARSE_MODE: &str = "DOCQL_PARSE_MODE";
pub const ENV_TIMEOUT_MS: &str = "DOCQL_TIMEOUT_MS";
pub const ENV_DATA_FILE: &str = "DOCQL_DATA_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logical database name, used in logs
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub parse_mode: ParseMode,
    /// Per-call store timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Default data file for `docql run`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

fn default_database() -> String {
    "docql".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            parse_mode: ParseMode::default(),
            timeout_ms: default_timeout_ms(),
            data_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// This also loads any `.env` file in the directory and applies
    /// environment variable overrides. A missing config file means defaults.
    pub fn load(dir: &Path) -> DbResult<Self> {
        Self::load_with_env(dir, ".env")
    }

    fn load_with_env(dir: &Path, env_file: &str) -> DbResult<Self> {
        // Load env file if present (ignore errors)
        let env_path = dir.join(env_file);
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a config file without environment overrides.
    pub fn from_file(path: &Path) -> DbResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DbError::Config(format!("{}: {}", path.display(), e)))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Empty or unparsable values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(database) = get(ENV_DATABASE) {
            self.database = database;
        }

        if let Some(mode) = get(ENV_PARSE_MODE).and_then(|m| m.parse::<ParseMode>().ok()) {
            self.parse_mode = mode;
        }

        if let Some(ms) = get(ENV_TIMEOUT_MS).and_then(|t| t.parse::<u64>().ok()) {
            self.timeout_ms = ms;
        }

        if let Some(path) = get(ENV_DATA_FILE) {
            self.data_file = Some(PathBuf::from(path));
        }
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> DbResult<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self).map_err(|e| DbError::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            mode: self.parse_mode,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
