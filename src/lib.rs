//! Movie Storage - durable key-value storage for a movie-browsing client
//!
//! Entries carry an optional expiry, optional obfuscation and a schema
//! version. Cache data is evicted oldest-first when the backing medium
//! fills up, and legacy keys are migrated on open.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{ApiCache, CacheKey};
pub use config::Config;
pub use error::StorageError;
pub use storage::LocalStore;
pub use tasks::spawn_cleanup_task;
