//! Capacity Recovery
//!
//! Runs when the medium rejects a write for lack of space. Only cache data is
//! ever evicted: entries tagged `cache` on write, or whose key contains the
//! cache marker.

use serde::Serialize;
use tracing::{info, warn};

use crate::storage::entry::created_at;
use crate::storage::{LocalStore, StoredEntry};

/// Share of the cache-tagged entries evicted per recovery, rounded up.
pub const EVICTION_FRACTION: f64 = 0.5;

// == Recovery Report ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    /// Removed by the expiration sweep that runs first
    pub expired_removed: usize,
    /// Cache keys evicted, oldest first
    pub evicted: Vec<String>,
}

impl LocalStore {
    // == Recover Capacity ==
    /// Sweeps expired entries, then evicts the oldest half of the cache entries.
    ///
    /// Each run strictly shrinks a non-empty cache set, so repeated quota failures
    /// make progress until no cache data is left.
    pub fn recover_capacity(&mut self) -> RecoveryReport {
        warn!("Storage quota exceeded, attempting to free up space");

        let expired_removed = self.clean_expired();

        let mut candidates: Vec<(u64, String)> = self
            .cache_keys()
            .into_iter()
            .map(|key| {
                let created = self.medium.get_item(&key).map_or(0, |raw| created_at(&raw));
                (created, key)
            })
            .collect();
        candidates.sort();

        let to_evict = (candidates.len() as f64 * EVICTION_FRACTION).ceil() as usize;
        let evicted: Vec<String> = candidates
            .into_iter()
            .take(to_evict)
            .map(|(_, key)| key)
            .collect();
        for key in &evicted {
            self.delete(key);
        }
        self.stats.record_evictions(evicted.len() as u64);

        info!("Freed up space by removing {} cached items", evicted.len());
        RecoveryReport {
            expired_removed,
            evicted,
        }
    }

    // == Cache Keys ==
    /// Keys eligible for eviction.
    pub fn cache_keys(&self) -> Vec<String> {
        self.list_keys()
            .into_iter()
            .filter(|key| self.is_cache_tagged(key))
            .collect()
    }

    fn is_cache_tagged(&self, key: &str) -> bool {
        let marker = &self.options.cache_marker;
        if !marker.is_empty() && key.contains(marker.as_str()) {
            return true;
        }
        self.medium
            .get_item(key)
            .and_then(|raw| StoredEntry::decode(&raw).ok())
            .is_some_and(|entry| entry.cache)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::error::StorageError;
    use crate::storage::{
        keys, LocalStore, ManualClock, Medium, MemoryMedium, PutOptions, StoreOptions,
    };

    const SECOND: Duration = Duration::from_secs(1);

    fn open(capacity: usize, clock: &ManualClock) -> LocalStore {
        LocalStore::open(
            Box::new(MemoryMedium::new(capacity)),
            Arc::new(clock.clone()),
            StoreOptions::default(),
        )
    }

    /// Writes `n` cache entries one second apart, oldest first.
    fn fill_cache(store: &mut LocalStore, clock: &ManualClock, n: usize) {
        for i in 0..n {
            store
                .put(&format!("cache_{}", i), &i, PutOptions::default())
                .unwrap();
            clock.advance(SECOND);
        }
    }

    #[test]
    fn test_recovery_evicts_oldest_half() {
        let clock = ManualClock::new(1_000);
        let mut store = open(usize::MAX, &clock);
        fill_cache(&mut store, &clock, 5);
        store.put(keys::USER_WISHLIST, &[1, 2], PutOptions::default()).unwrap();

        let report = store.recover_capacity();

        assert_eq!(report.evicted, vec!["cache_0", "cache_1", "cache_2"]);
        assert_eq!(store.cache_keys(), vec!["cache_3", "cache_4"]);
        assert!(store.contains(keys::USER_WISHLIST));
        assert_eq!(store.stats().evictions, 3);
    }

    #[test]
    fn test_repeated_recovery_drains_cache() {
        let clock = ManualClock::new(0);
        let mut store = open(usize::MAX, &clock);
        fill_cache(&mut store, &clock, 5);

        let sizes: Vec<usize> = (0..4)
            .map(|_| store.recover_capacity().evicted.len())
            .collect();
        assert_eq!(sizes, vec![3, 1, 1, 0]);
        assert!(store.cache_keys().is_empty());
    }

    #[test]
    fn test_explicit_cache_tag_is_evictable() {
        let clock = ManualClock::new(0);
        let mut store = open(usize::MAX, &clock);
        store
            .put("trending_now", &1, PutOptions::cached(Duration::from_secs(60)))
            .unwrap();
        store.put("profile", &2, PutOptions::default()).unwrap();

        assert_eq!(store.cache_keys(), vec!["trending_now"]);
        assert_eq!(store.recover_capacity().evicted, vec!["trending_now"]);
        assert!(store.contains("profile"));
    }

    #[test]
    fn test_eviction_orders_by_creation_time() {
        let clock = ManualClock::new(5_000);
        let mut store = open(usize::MAX, &clock);
        fill_cache(&mut store, &clock, 2);

        // Written at time zero, so older than anything above
        store
            .medium
            .set_item(
                "cache_legacy",
                r#"{"value":1,"timestamp":0,"version":"0.9.0"}"#,
            )
            .unwrap();

        let report = store.recover_capacity();
        assert_eq!(report.evicted, vec!["cache_legacy", "cache_0"]);
    }

    #[test]
    fn test_quota_failure_triggers_recovery_and_reports() {
        let clock = ManualClock::new(0);
        let mut store = open(400, &clock);
        fill_cache(&mut store, &clock, 4);

        let big = "x".repeat(400);
        let result = store.put("movie_app_preferences", &big, PutOptions::default());

        assert!(matches!(result, Err(StorageError::CapacityExceeded(_))));
        assert_eq!(store.cache_keys(), vec!["cache_2", "cache_3"]);
        assert_eq!(store.stats().capacity_failures, 1);
        assert!(store.get::<String>("movie_app_preferences").is_none());
    }

    #[test]
    fn test_retry_after_recovery_succeeds() {
        let clock = ManualClock::new(0);
        let mut store = open(400, &clock);
        fill_cache(&mut store, &clock, 4);

        let value = "y".repeat(60);
        let first = store.put("movie_app_settings", &value, PutOptions::default());
        assert!(matches!(first, Err(StorageError::CapacityExceeded(_))));

        store
            .put("movie_app_settings", &value, PutOptions::default())
            .unwrap();
        assert_eq!(store.get::<String>("movie_app_settings"), Some(value));
    }
}
