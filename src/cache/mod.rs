//! API Response Cache
//!
//! Caller-level cache for movie API responses, layered on the [`LocalStore`].
//! Reads go to the store first; on a miss the caller's fetch runs and its result
//! is written back with a TTL.
//!
//! [`LocalStore`]: crate::storage::LocalStore

mod fetch;
mod keys;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::storage::LocalStore;

pub use fetch::{ApiCache, CacheStats};
pub use keys::CacheKey;

/// The process-wide store, shared between async callers.
pub type SharedStore = Arc<RwLock<LocalStore>>;

/// Wraps a store for sharing.
pub fn shared(store: LocalStore) -> SharedStore {
    Arc::new(RwLock::new(store))
}

// == Cache Durations ==
/// 5 minutes
pub const SHORT: Duration = Duration::from_secs(5 * 60);
/// 30 minutes
pub const MEDIUM: Duration = Duration::from_secs(30 * 60);
/// 24 hours
pub const LONG: Duration = Duration::from_secs(24 * 60 * 60);
/// 7 days
pub const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);
