//! Runtime configuration resolved from environment variables.
//!
//! | Variable            | Meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `POKEDEX_DB_PATH`   | SQLite file; in-memory store when unset   |
//! | `POKEDEX_LOG_LEVEL` | trace, debug, info, warn or error         |
//! | `POKEDEX_LOG_DIR`   | Absolute log directory; no file logs when unset |

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::default_log_level;
use rusqlite::Connection;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "POKEDEX_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "POKEDEX_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "POKEDEX_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Opens the configured store with migrations applied.
    pub fn open_store(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Human-readable store location.
    pub fn store_label(&self) -> String {
        self.db_path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string())
    }
}
