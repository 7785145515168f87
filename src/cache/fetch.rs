use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheKey, SharedStore};
use crate::error::Result;
use crate::storage::keys::{scoped, CACHE_MOVIE_DETAILS, CACHE_PREFIX};
use crate::storage::PutOptions;

// == Cache Stats ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Size of the whole backing medium, human readable
    pub size: String,
    pub item_count: usize,
    pub cache_keys: Vec<String>,
}

// == Api Cache ==
/// Read-through cache for API responses. Every entry it writes is cache-tagged,
/// so capacity recovery may evict it.
#[derive(Debug, Clone)]
pub struct ApiCache {
    store: SharedStore,
}

impl ApiCache {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stores `value` for `key` with the key's default TTL.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) -> Result<()> {
        self.put_for(&key.key(), value, key.default_ttl()).await
    }

    /// Stores `value` under a raw key for `ttl`.
    pub async fn put_for<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        self.store
            .write()
            .await
            .put(key, value, PutOptions::cached(ttl))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.store.write().await.get(&key.key())
    }

    // == Fetch With Cache ==
    /// Returns the cached value for `key`, or awaits `fetch` and caches its result
    /// for `ttl`.
    ///
    /// The store is not locked while `fetch` runs. If caching the result fails
    /// (e.g. the quota is exhausted) the fetched value is still returned.
    pub async fn fetch_with_cache<T, F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(cached) = self.store.write().await.get::<T>(key) {
            debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        debug!("Cache miss: {}, fetching from API", key);
        let data = fetch().await?;
        if let Err(e) = self.put_for(key, &data, ttl).await {
            warn!("Could not cache {}: {}", key, e);
        }
        Ok(data)
    }

    /// [`ApiCache::fetch_with_cache`] with the key's default TTL.
    pub async fn fetch<T, F, Fut, E>(&self, key: &CacheKey, fetch: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.fetch_with_cache(&key.key(), key.default_ttl(), fetch)
            .await
    }

    // == Maintenance ==
    pub async fn is_valid(&self, key: &CacheKey) -> bool {
        self.store.write().await.contains(&key.key())
    }

    pub async fn clear_movie(&self, movie_id: u64) {
        self.store
            .write()
            .await
            .delete(&scoped(CACHE_MOVIE_DETAILS, movie_id));
    }

    /// Removes every `movie_app_cache*` entry. Returns how many were removed.
    pub async fn clear_all(&self) -> usize {
        self.store.write().await.clear_by_prefix(CACHE_PREFIX)
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let cache_keys = store.cache_keys();
        CacheStats {
            size: store.readable_size(),
            item_count: cache_keys.len(),
            cache_keys,
        }
    }
}
