//! Configuration Module
//!
//! Handles loading cache and driver configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache and demo driver configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds, also drives the janitor cadence
    pub default_ttl_ms: u64,
    /// Capacity ceiling that triggers an inline sweep on insert
    pub max_entries: usize,
    /// Whether a janitor task is paired with the cache
    pub janitor: bool,
    /// Number of concurrent writer threads in the driver
    pub writers: usize,
    /// Number of concurrent reader threads in the driver
    pub readers: usize,
    /// Writes issued by each writer thread
    pub writes_per_worker: usize,
    /// Reads issued by each reader thread
    pub reads_per_worker: usize,
    /// Number of distinct keys the driver draws from
    pub key_space: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 20)
    /// - `MAX_ENTRIES` - Capacity ceiling (default: 1000)
    /// - `JANITOR` - Run the background janitor (default: true)
    /// - `WRITERS` - Writer threads (default: 4)
    /// - `READERS` - Reader threads (default: 4)
    /// - `WRITES_PER_WORKER` - Writes per writer (default: 250000)
    /// - `READS_PER_WORKER` - Reads per reader (default: 750000)
    /// - `KEY_SPACE` - Distinct keys (default: 20000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            janitor: env_or("JANITOR", defaults.janitor),
            writers: env_or("WRITERS", defaults.writers),
            readers: env_or("READERS", defaults.readers),
            writes_per_worker: env_or("WRITES_PER_WORKER", defaults.writes_per_worker),
            reads_per_worker: env_or("READS_PER_WORKER", defaults.reads_per_worker),
            key_space: env_or("KEY_SPACE", defaults.key_space),
        }
    }

    /// Default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Rejects values the cache or the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "MAX_ENTRIES must be greater than zero".to_string(),
            ));
        }
        if self.key_space == 0 {
            return Err(CacheError::InvalidConfig(
                "KEY_SPACE must be greater than zero".to_string(),
            ));
        }
        if self.janitor && self.default_ttl_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "DEFAULT_TTL_MS must be greater than zero when the janitor is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 20,
            max_entries: 1000,
            janitor: true,
            writers: 4,
            readers: 4,
            writes_per_worker: 250_000,
            reads_per_worker: 750_000,
            key_space: 20_000,
        }
    }
}
