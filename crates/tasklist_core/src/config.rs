//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables behave as unset.
//! - Resolution has no side effects; nothing is created on disk.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORE_PATH_ENV: &str = "TASKLIST_STORE_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKLIST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKLIST_LOG_DIR";

const DEFAULT_STORE_FILE_NAME: &str = "tasklist.sqlite3";

/// Configuration resolution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the FFI and CLI entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the key-value entries.
    pub store_path: PathBuf,
    /// Normalized log level.
    pub log_level: &'static str,
    /// Log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_path: std::env::temp_dir().join(DEFAULT_STORE_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from `TASKLIST_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(value) => normalize_level(&value).map_err(|message| ConfigError::InvalidValue {
                key: LOG_LEVEL_ENV,
                message,
            })?,
            None => defaults.log_level,
        };

        Ok(Self {
            store_path: read(STORE_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            log_level,
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        })
    }
}
