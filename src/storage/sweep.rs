//! Expiration Sweep
//!
//! Eager half of the expiration policy. Reads already drop stale entries lazily;
//! the sweep walks the whole medium and drops every expired entry and any text
//! that is not JSON.

use tracing::{debug, info, warn};

use crate::storage::entry::sweep_expiry;
use crate::storage::{keys, LocalStore, PutOptions};

impl LocalStore {
    // == Clean Expired ==
    /// Removes every entry whose TTL has elapsed or whose text is not JSON.
    /// Keys the store did not write are scanned too; JSON without an
    /// `expiresAt` is kept.
    ///
    /// Returns the number of keys removed.
    pub fn clean_expired(&mut self) -> usize {
        if !self.is_supported() {
            return 0;
        }

        let now = self.now_ms();
        let mut expired = 0u64;
        let mut corrupt = 0u64;

        for key in self.medium.keys() {
            let Some(raw) = self.medium.get_item(&key) else {
                continue;
            };
            match sweep_expiry(&raw) {
                Ok(Some(expires)) if now > expires => {
                    self.delete(&key);
                    expired += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Sweep removing unreadable {}: {}", key, e);
                    self.delete(&key);
                    corrupt += 1;
                }
            }
        }

        self.stats.record_expired(expired);
        self.stats.record_corrupt(corrupt);
        let removed = (expired + corrupt) as usize;
        info!("Cleaned {} expired items from storage", removed);
        removed
    }

    // == Auto Cleanup ==
    /// Runs [`LocalStore::clean_expired`] if the last recorded sweep is older than
    /// the cleanup interval (or was never recorded), then records `now`.
    ///
    /// Returns the number removed, or None when no sweep was due.
    pub fn auto_cleanup(&mut self) -> Option<usize> {
        if !self.is_supported() {
            return None;
        }

        let now = self.now_ms();
        let interval = self.options.cleanup_interval.as_millis() as u64;
        let due = match self.get::<u64>(keys::LAST_CLEANUP) {
            Some(last) => now.saturating_sub(last) > interval,
            None => true,
        };
        if !due {
            debug!("Storage sweep not due yet");
            return None;
        }

        let removed = self.clean_expired();
        if let Err(e) = self.put(keys::LAST_CLEANUP, &now, PutOptions::default()) {
            warn!("Failed to record last cleanup time: {}", e);
        }
        Some(removed)
    }
}
