//! Configuration Module
//!
//! Loads the default store's parameters from environment variables.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Environment variable holding the default store's entry limit.
pub const MAX_ENTRIES_VAR: &str = "MEMO_CACHE_MAX_ENTRIES";

/// Environment variable holding the sweep interval in seconds.
pub const CLEANUP_INTERVAL_VAR: &str = "MEMO_CACHE_CLEANUP_INTERVAL";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the default store holds (0 = unbounded)
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_CACHE_MAX_ENTRIES` - Maximum store entries (default: 10000)
    /// - `MEMO_CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: read_setting(MAX_ENTRIES_VAR, defaults.max_entries),
            cleanup_interval: read_setting(CLEANUP_INTERVAL_VAR, defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            cleanup_interval: 60,
        }
    }
}

/// Reads a typed setting from the environment.
///
/// Returns `default` when the variable is unset or does not parse as `T`.
pub fn read_setting<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(setting = name, value = %raw, "Ignoring unparsable setting");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var(MAX_ENTRIES_VAR);
        env::remove_var(CLEANUP_INTERVAL_VAR);

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_read_setting_parses_value() {
        env::set_var("MEMO_CACHE_TEST_PARSED", " 42 ");
        assert_eq!(read_setting("MEMO_CACHE_TEST_PARSED", 7u32), 42);
        env::remove_var("MEMO_CACHE_TEST_PARSED");
    }

    #[test]
    fn test_read_setting_falls_back() {
        env::remove_var("MEMO_CACHE_TEST_MISSING");
        assert_eq!(read_setting("MEMO_CACHE_TEST_MISSING", 7u32), 7);

        env::set_var("MEMO_CACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(read_setting("MEMO_CACHE_TEST_GARBAGE", 7u32), 7);
        env::remove_var("MEMO_CACHE_TEST_GARBAGE");
    }
}
