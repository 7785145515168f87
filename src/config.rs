//! Configuration Module
//!
//! Loads server and storage configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::{StoreOptions, DEFAULT_CAPACITY, DEFAULT_OBFUSCATION_KEY};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// File backing the store, None keeps everything in memory
    pub storage_path: Option<PathBuf>,
    /// Backing medium capacity in bytes
    pub storage_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between checks whether the daily sweep is due
    pub cleanup_check_interval: u64,
    /// Key for obfuscating sensitive values
    pub obfuscation_key: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORAGE_PATH` - Storage file (default: unset, in-memory)
    /// - `STORAGE_CAPACITY` - Capacity in bytes (default: 5 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_CHECK_INTERVAL` - Sweep check frequency in seconds (default: 3600)
    /// - `STORAGE_OBFUSCATION_KEY` - Obfuscation key (default: built-in key)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_path: env::var("STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            storage_capacity: env::var("STORAGE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.storage_capacity),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_check_interval: env::var("CLEANUP_CHECK_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.cleanup_check_interval),
            obfuscation_key: env::var("STORAGE_OBFUSCATION_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.obfuscation_key),
        }
    }

    /// Store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            obfuscation_key: self.obfuscation_key.clone(),
            ..StoreOptions::default()
        }
    }

    pub fn cleanup_check_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_check_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: None,
            storage_capacity: DEFAULT_CAPACITY,
            server_port: 3000,
            cleanup_check_interval: 3600,
            obfuscation_key: DEFAULT_OBFUSCATION_KEY.to_string(),
        }
    }
}
