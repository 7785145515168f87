//! Version Migrator
//!
//! Moves legacy flat keys to their namespaced names. Runs from
//! [`LocalStore::open`] when the stored version marker is missing or differs
//! from the current schema version. Assumes no other writer during the move.

use tracing::{debug, info, warn};

use serde_json::Value;

use crate::error::{Result, StorageError};
use crate::storage::{LocalStore, PutOptions, StoredEntry};

// == Migration Report ==
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Version marker found before migrating, None for fresh or pre-versioning data
    pub from: Option<String>,
    pub to: String,
    /// (legacy key, new key) pairs that were moved
    pub moved: Vec<(String, String)>,
    /// Legacy keys that existed but could not be moved
    pub failed: Vec<StorageError>,
}

impl LocalStore {
    /// Copies each mapped legacy key to its new key, then removes the legacy key.
    /// Unmapped keys are left alone.
    ///
    /// A failed copy is logged and recorded; the remaining keys still migrate.
    pub fn migrate(&mut self, from: Option<&str>) -> MigrationReport {
        info!(
            "Migrating storage from {} to {}",
            from.unwrap_or("unversioned"),
            self.options.version
        );

        let mut report = MigrationReport {
            from: from.map(str::to_string),
            to: self.options.version.clone(),
            ..MigrationReport::default()
        };

        for (old_key, new_key) in self.options.legacy_keys.clone() {
            let Some(raw) = self.medium.get_item(&old_key) else {
                continue;
            };

            let copied = self
                .upgrade_legacy(&raw)
                .and_then(|text| {
                    self.medium
                        .set_item(&new_key, &text)
                        .map_err(|e| StorageError::Medium(e.to_string()))
                });
            if let Err(e) = copied {
                let err = StorageError::MigrationIncomplete {
                    key: old_key,
                    reason: e.to_string(),
                };
                warn!("{}", err);
                report.failed.push(err);
                continue;
            }
            if let Err(e) = self.medium.remove_item(&old_key) {
                warn!("Migrated {} but could not remove it: {}", old_key, e);
            }

            debug!("Moved {} to {}", old_key, new_key);
            report.moved.push((old_key, new_key));
        }

        report
    }

    /// Framed entries move verbatim. Pre-versioning values are plain JSON (or
    /// plain text) and get wrapped in an entry with no TTL so reads return them.
    fn upgrade_legacy(&self, raw: &str) -> Result<String> {
        if StoredEntry::decode(raw).is_ok() {
            return Ok(raw.to_string());
        }
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        self.frame(value, &PutOptions::default())
    }
}
