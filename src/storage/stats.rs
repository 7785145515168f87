//! Storage Statistics Module
//!
//! Counts what the store did since it was opened.

use serde::Serialize;

// == Store Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (missing, expired or corrupt)
    pub misses: u64,
    /// Entries removed because their TTL elapsed (on read or by a sweep)
    pub expired: u64,
    /// Entries removed because they could not be decoded
    pub corrupt: u64,
    /// Cache entries evicted by capacity recovery
    pub evictions: u64,
    /// Writes rejected by the backing medium for lack of space
    pub capacity_failures: u64,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self, count: u64) {
        self.expired += count;
    }

    pub fn record_corrupt(&mut self, count: u64) {
        self.corrupt += count;
    }

    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    pub fn record_capacity_failure(&mut self) {
        self.capacity_failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StoreStats::new();
        assert_eq!(stats, StoreStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = StoreStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_counts() {
        let mut stats = StoreStats::new();
        stats.record_expired(2);
        stats.record_corrupt(1);
        stats.record_evictions(3);
        stats.record_capacity_failure();
        assert_eq!(stats.expired, 2);
        assert_eq!(stats.corrupt, 1);
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.capacity_failures, 1);
    }
}
