//! Local Store Module
//!
//! The persistent, expiring, versioned key-value store. Frames every value with
//! [`StoredEntry`] on top of a [`Medium`], drops stale or corrupt entries on read,
//! and degrades to a silent no-op when the medium is unusable.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StorageError};
use crate::storage::{
    keys, Clock, MemoryMedium, Medium, Obfuscator, PutOptions, StoreStats, StoredEntry,
    SystemClock, CACHE_MARKER, CURRENT_STORAGE_VERSION, DEFAULT_OBFUSCATION_KEY,
};

/// How often the automatic sweep may run.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

// == Store Options ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Schema version stamped on entries and kept in the version marker
    pub version: String,
    /// Key substring that marks an entry as evictable cache data
    pub cache_marker: String,
    /// Minimum time between automatic sweeps
    pub cleanup_interval: Duration,
    /// Legacy key -> current key, applied when the version marker changes
    pub legacy_keys: Vec<(String, String)>,
    pub obfuscation_key: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            version: CURRENT_STORAGE_VERSION.to_string(),
            cache_marker: CACHE_MARKER.to_string(),
            cleanup_interval: CLEANUP_INTERVAL,
            legacy_keys: keys::LEGACY_KEYS
                .iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
            obfuscation_key: DEFAULT_OBFUSCATION_KEY.to_string(),
        }
    }
}

// == Storage Info ==
/// Summary of the backing medium, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageInfo {
    pub supported: bool,
    pub size_bytes: usize,
    pub readable_size: String,
    pub item_count: usize,
    pub cache_item_count: usize,
    pub version: String,
    pub hit_rate: f64,
}

// == Local Store ==
/// One logical store per process. Construct it once and hand it to callers.
pub struct LocalStore {
    pub(crate) medium: Box<dyn Medium>,
    clock: Arc<dyn Clock>,
    obfuscator: Obfuscator,
    pub(crate) options: StoreOptions,
    supported: bool,
    pub(crate) stats: StoreStats,
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("options", &self.options)
            .field("supported", &self.supported)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    // == Constructor ==
    /// Opens the store over `medium`.
    ///
    /// Probes the medium once, migrates legacy keys when the version marker
    /// differs from `options.version`, then runs the automatic sweep if it is due.
    pub fn open(medium: Box<dyn Medium>, clock: Arc<dyn Clock>, options: StoreOptions) -> Self {
        let obfuscator = Obfuscator::new(options.obfuscation_key.clone());
        let mut store = Self {
            medium,
            clock,
            obfuscator,
            options,
            supported: false,
            stats: StoreStats::new(),
        };

        store.supported = match store.medium.probe() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", StorageError::UnsupportedMedium(e.to_string()));
                false
            }
        };
        store.initialize();
        store
    }

    /// In-memory store of [`DEFAULT_CAPACITY`](crate::storage::DEFAULT_CAPACITY) bytes on the system clock.
    pub fn in_memory() -> Self {
        Self::open(
            Box::new(MemoryMedium::default()),
            Arc::new(SystemClock),
            StoreOptions::default(),
        )
    }

    fn initialize(&mut self) {
        if !self.supported {
            return;
        }

        let stored_version: Option<String> = self.get(keys::STORAGE_VERSION);
        if stored_version.as_deref() != Some(self.options.version.as_str()) {
            let report = self.migrate(stored_version.as_deref());
            info!(
                "Storage migrated to {}: {} keys moved, {} failed",
                report.to,
                report.moved.len(),
                report.failed.len()
            );
            let version = self.options.version.clone();
            if let Err(e) = self.put(keys::STORAGE_VERSION, &version, PutOptions::default()) {
                warn!("Failed to write storage version marker: {}", e);
            }
        }

        self.auto_cleanup();
    }

    // == Put ==
    /// Frames `value` and writes it under `key`, replacing any previous entry.
    ///
    /// When the medium is full, capacity recovery runs once and the call still
    /// fails with [`StorageError::CapacityExceeded`]; retrying is up to the caller.
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
        options: PutOptions,
    ) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| StorageError::InvalidValue(e.to_string()))?;
        self.put_value(key, value, options)
    }

    /// Untyped form of [`LocalStore::put`].
    pub fn put_value(&mut self, key: &str, value: Value, options: PutOptions) -> Result<()> {
        if !self.supported {
            debug!("Storage unsupported, dropping write to {}", key);
            return Ok(());
        }

        let raw = self.frame(value, &options)?;

        match self.medium.set_item(key, &raw) {
            Ok(()) => {
                debug!("Stored {} ({} bytes)", key, raw.len());
                Ok(())
            }
            Err(e) if e.is_quota_exceeded() => {
                error!("Storage quota exceeded writing {}: {}", key, e);
                self.stats.record_capacity_failure();
                self.recover_capacity();
                Err(StorageError::CapacityExceeded(e.to_string()))
            }
            Err(e) => {
                error!("Failed to save {} to storage: {}", key, e);
                Err(StorageError::Medium(e.to_string()))
            }
        }
    }

    /// Encodes `value` as an entry written now under the current version.
    pub(crate) fn frame(&self, value: Value, options: &PutOptions) -> Result<String> {
        StoredEntry::new(
            value,
            options,
            self.now_ms(),
            &self.options.version,
            &self.obfuscator,
        )?
        .encode()
    }

    // == Get ==
    /// Reads the value under `key` as `T`.
    ///
    /// Returns None when the key is missing, expired, corrupt, or holds a value
    /// that does not deserialize as `T`. A type mismatch leaves the entry in place.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Entry {} does not have the expected type: {}", key, e);
                None
            }
        }
    }

    /// Untyped form of [`LocalStore::get`].
    pub fn get_value(&mut self, key: &str) -> Option<Value> {
        if !self.supported {
            return None;
        }

        let Some(raw) = self.medium.get_item(key) else {
            self.stats.record_miss();
            return None;
        };

        let entry = match StoredEntry::decode(&raw) {
            Ok(entry) => entry,
            Err(e) => return self.discard_corrupt(key, e),
        };

        if entry.is_expired(self.now_ms()) {
            debug!("Entry {} expired", key);
            self.delete(key);
            self.stats.record_expired(1);
            self.stats.record_miss();
            return None;
        }

        match entry.into_value(&self.obfuscator) {
            Ok(value) => {
                self.stats.record_hit();
                Some(value)
            }
            Err(e) => self.discard_corrupt(key, e),
        }
    }

    fn discard_corrupt(&mut self, key: &str, err: StorageError) -> Option<Value> {
        warn!("Removing unreadable entry {}: {}", key, err);
        self.delete(key);
        self.stats.record_corrupt(1);
        self.stats.record_miss();
        None
    }

    /// True when `key` holds a live, readable entry.
    pub fn contains(&mut self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    // == Delete ==
    /// Removes `key`. Removing a missing key is not an error.
    pub fn delete(&mut self, key: &str) {
        if !self.supported {
            return;
        }
        if let Err(e) = self.medium.remove_item(key) {
            warn!("Failed to remove {} from storage: {}", key, e);
        }
    }

    /// Removes every key in the medium, including keys this store did not write.
    pub fn clear(&mut self) {
        if !self.supported {
            return;
        }
        if let Err(e) = self.medium.clear() {
            warn!("Failed to clear storage: {}", e);
        }
    }

    /// Removes every key starting with `prefix` and returns how many there were.
    pub fn clear_by_prefix(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .list_keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        for key in &doomed {
            self.delete(key);
        }
        debug!("Cleared {} keys with prefix {}", doomed.len(), prefix);
        doomed.len()
    }

    // == Inspection ==
    /// Every key in the medium, including keys outside the store's conventions.
    pub fn list_keys(&self) -> Vec<String> {
        if !self.supported {
            return Vec::new();
        }
        self.medium.keys()
    }

    /// Stored text under `key`, without decoding. For diagnostics.
    pub fn raw(&self, key: &str) -> Option<String> {
        if !self.supported {
            return None;
        }
        self.medium.get_item(key)
    }

    /// Sum of key length plus stored text length over all keys.
    pub fn size_bytes(&self) -> usize {
        self.list_keys()
            .iter()
            .map(|key| key.len() + self.medium.get_item(key).map_or(0, |raw| raw.len()))
            .sum()
    }

    pub fn readable_size(&self) -> String {
        format_bytes(self.size_bytes())
    }

    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            supported: self.supported,
            size_bytes: self.size_bytes(),
            readable_size: self.readable_size(),
            item_count: self.list_keys().len(),
            cache_item_count: self.cache_keys().len(),
            version: self.options.version.clone(),
            hit_rate: self.stats.hit_rate(),
        }
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.clone()
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn version(&self) -> &str {
        &self.options.version
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

/// Formats a byte count as `"<n>.<nn> <unit>"` in steps of 1024.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
