//! Storage Module
//!
//! Persistent key-value store with per-entry expiration, schema versioning,
//! legacy-key migration, quota recovery and optional value obfuscation.

mod clock;
mod entry;
pub mod keys;
mod medium;
mod migrate;
mod obfuscate;
mod recovery;
mod stats;
mod store;
mod sweep;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{PutOptions, StoredEntry};
pub use medium::{FileMedium, Medium, MediumError, MemoryMedium, PROBE_KEY};
pub use migrate::MigrationReport;
pub use obfuscate::{Obfuscator, DEFAULT_OBFUSCATION_KEY};
pub use recovery::{RecoveryReport, EVICTION_FRACTION};
pub use stats::StoreStats;
pub use store::{format_bytes, LocalStore, StorageInfo, StoreOptions, CLEANUP_INTERVAL};

// == Public Constants ==
/// Schema version stamped on every entry; bump when the layout changes
pub const CURRENT_STORAGE_VERSION: &str = "1.0.0";

/// Key substring that marks an entry as disposable cache data
pub const CACHE_MARKER: &str = "cache";

/// Default backing capacity, the usual browser local-storage quota
pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;
