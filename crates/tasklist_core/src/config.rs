//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings for FFI and CLI hosts.
//!
//! # Invariants
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKLIST_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKLIST_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the key-value store.
    pub db_path: PathBuf,
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: non_blank(ENV_LOG_LEVEL)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}

/// Default on-device database location.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config.db_path, default_db_path());
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = CoreConfig::from_lookup(|name| match name {
            ENV_DB_PATH => Some(" /data/tasks.db ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            ENV_LOG_DIR => Some("/data/logs".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/data/tasks.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/data/logs")));
    }
}
