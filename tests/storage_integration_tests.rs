//! Integration Tests for the file-backed store
//!
//! Exercises open, migration, persistence and quota recovery against a real
//! storage file.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use movie_storage::cache::{shared, ApiCache, CacheKey};
use movie_storage::storage::{
    keys, FileMedium, LocalStore, ManualClock, PutOptions, StoreOptions, CURRENT_STORAGE_VERSION,
};
use movie_storage::StorageError;
use serde_json::json;
use tempfile::tempdir;

// == Helper Functions ==

fn open_file_store(path: &std::path::Path, capacity: usize, clock: &ManualClock) -> LocalStore {
    let medium = FileMedium::open(path, capacity).unwrap();
    LocalStore::open(
        Box::new(medium),
        Arc::new(clock.clone()),
        StoreOptions::default(),
    )
}

// == Persistence ==

#[test]
fn test_values_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = ManualClock::new(1_000);

    {
        let mut store = open_file_store(&path, usize::MAX, &clock);
        store
            .put(keys::USER_SETTINGS, &json!({"language": "en"}), PutOptions::default())
            .unwrap();
        store
            .put(keys::AUTH_TOKEN, "tok-123", PutOptions::encrypted())
            .unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("tok-123"));

    let mut store = open_file_store(&path, usize::MAX, &clock);
    assert_eq!(
        store.get_value(keys::USER_SETTINGS),
        Some(json!({"language": "en"}))
    );
    assert_eq!(store.get::<String>(keys::AUTH_TOKEN).as_deref(), Some("tok-123"));
}

#[test]
fn test_expired_entries_swept_on_reopen_after_a_day() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = ManualClock::new(0);

    {
        let mut store = open_file_store(&path, usize::MAX, &clock);
        store
            .put(keys::CACHE_TRENDING, &[1, 2, 3], PutOptions::cached(Duration::from_secs(300)))
            .unwrap();
    }

    clock.advance(Duration::from_secs(25 * 60 * 60));
    let store = open_file_store(&path, usize::MAX, &clock);

    assert!(store.raw(keys::CACHE_TRENDING).is_none());
}

#[test]
fn test_corrupt_file_is_set_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    fs::write(&path, "{{ not a map").unwrap();

    let clock = ManualClock::new(0);
    let store = open_file_store(&path, usize::MAX, &clock);

    assert!(store.is_supported());
    assert!(path.with_extension("corrupt").exists());
    assert_eq!(store.version(), CURRENT_STORAGE_VERSION);
}

// == Migration ==

#[test]
fn test_legacy_keys_migrated_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let legacy_wishlist = r#"{"value":[550,680],"timestamp":0}"#;

    let mut seeded = BTreeMap::new();
    seeded.insert("movieWishlist".to_string(), legacy_wishlist.to_string());
    seeded.insert("users".to_string(), r#"[{"id":"a@b.com"}]"#.to_string());
    seeded.insert("theme".to_string(), r#""dark""#.to_string());
    seeded.insert("unrelated".to_string(), "left alone".to_string());
    fs::write(&path, serde_json::to_string(&seeded).unwrap()).unwrap();

    let clock = ManualClock::new(10_000);
    let mut store = open_file_store(&path, usize::MAX, &clock);

    assert!(store.raw("movieWishlist").is_none());
    assert_eq!(store.raw(keys::USER_WISHLIST).as_deref(), Some(legacy_wishlist));
    assert_eq!(store.get::<Vec<u64>>(keys::USER_WISHLIST), Some(vec![550, 680]));
    assert_eq!(
        store.get::<String>(keys::STORAGE_VERSION).as_deref(),
        Some(CURRENT_STORAGE_VERSION)
    );

    // Pre-versioning JSON is framed on the way over and reads back
    assert!(store.raw("users").is_none());
    assert_eq!(
        store.get_value(keys::AUTH_USERS),
        Some(json!([{"id": "a@b.com"}]))
    );

    // Unmapped JSON stays, text that is not JSON is swept on open
    assert_eq!(store.raw("theme").as_deref(), Some(r#""dark""#));
    assert!(store.raw("unrelated").is_none());
}

// == Quota Recovery ==

#[test]
fn test_quota_failure_evicts_cache_then_retry_succeeds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = ManualClock::new(0);
    let mut store = open_file_store(&path, 1_024, &clock);

    for i in 0..4 {
        clock.advance(Duration::from_secs(1));
        store
            .put(
                &keys::scoped(keys::CACHE_PREFIX, i),
                &"m".repeat(100),
                PutOptions::cached(Duration::from_secs(3600)),
            )
            .unwrap();
    }

    let big = "x".repeat(600);
    let err = store
        .put(keys::USER_SETTINGS, &big, PutOptions::default())
        .unwrap_err();
    assert!(matches!(err, StorageError::CapacityExceeded(_)));

    // Oldest half of the cache set is gone
    assert!(store.raw(&keys::scoped(keys::CACHE_PREFIX, 0)).is_none());
    assert!(store.raw(&keys::scoped(keys::CACHE_PREFIX, 1)).is_none());
    assert!(store.raw(&keys::scoped(keys::CACHE_PREFIX, 3)).is_some());
    assert!(store.stats().capacity_failures >= 1);

    // The freed space now takes a smaller write
    let smaller = "y".repeat(300);
    store
        .put(keys::USER_SETTINGS, &smaller, PutOptions::default())
        .unwrap();
    assert_eq!(store.get::<String>(keys::USER_SETTINGS), Some(smaller));
}

// == API cache over a file ==

#[tokio::test]
async fn test_api_cache_over_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = ManualClock::new(0);
    let store = shared(open_file_store(&path, usize::MAX, &clock));
    let cache = ApiCache::new(store.clone());

    cache
        .put(&CacheKey::MovieDetails(603), &json!({"title": "The Matrix"}))
        .await
        .unwrap();
    assert!(cache.is_valid(&CacheKey::MovieDetails(603)).await);

    cache.clear_movie(603).await;
    assert!(!cache.is_valid(&CacheKey::MovieDetails(603)).await);
}
