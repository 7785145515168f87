//! Backing Medium Module
//!
//! The raw string-keyed, string-valued persistent map the store is layered on.
//! A medium has a finite capacity and reports overflow as a distinct error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::storage::DEFAULT_CAPACITY;

/// Key written and removed by the support probe.
pub const PROBE_KEY: &str = "__storage_test__";

// == Medium Error ==
#[derive(Error, Debug)]
pub enum MediumError {
    /// The write would push the medium past its capacity
    #[error("Quota exceeded: {needed} bytes needed, capacity is {capacity} bytes")]
    QuotaExceeded { needed: usize, capacity: usize },

    /// The medium is disabled or cannot be used at all
    #[error("Medium unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),
}

impl MediumError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, MediumError::QuotaExceeded { .. })
    }
}

// == Medium Trait ==
/// Synchronous string map with finite capacity.
///
/// Every mutation is applied immediately; there is no write-behind buffering.
pub trait Medium: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError>;

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError>;

    fn clear(&mut self) -> Result<(), MediumError>;

    /// All keys currently stored, in key order.
    fn keys(&self) -> Vec<String>;

    /// Writes and removes a throwaway key to check the medium accepts writes.
    fn probe(&mut self) -> Result<(), MediumError> {
        self.set_item(PROBE_KEY, "test")?;
        self.remove_item(PROBE_KEY)
    }
}

/// Size accounting shared by the bundled media: key length plus value length.
fn item_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Capacity check for writing `key = value` into `items`.
fn check_capacity(
    items: &BTreeMap<String, String>,
    used: usize,
    capacity: usize,
    key: &str,
    value: &str,
) -> Result<usize, MediumError> {
    let replaced = items.get(key).map(|old| item_size(key, old)).unwrap_or(0);
    let needed = used - replaced + item_size(key, value);
    if needed > capacity {
        return Err(MediumError::QuotaExceeded { needed, capacity });
    }
    Ok(needed)
}

// == Memory Medium ==
/// In-process medium with a byte capacity. Contents vanish with the process.
#[derive(Debug)]
pub struct MemoryMedium {
    items: BTreeMap<String, String>,
    used: usize,
    capacity: usize,
    available: bool,
}

impl MemoryMedium {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            used: 0,
            capacity,
            available: true,
        }
    }

    /// A medium that rejects every operation, like disabled browser storage.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0)
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.used
    }

    fn ensure_available(&self) -> Result<(), MediumError> {
        if self.available {
            Ok(())
        } else {
            Err(MediumError::Unavailable("storage is disabled".to_string()))
        }
    }
}

impl Default for MemoryMedium {
    /// Bounded like browser storage, at [`DEFAULT_CAPACITY`].
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Medium for MemoryMedium {
    fn get_item(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        self.ensure_available()?;
        self.used = check_capacity(&self.items, self.used, self.capacity, key, value)?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        self.ensure_available()?;
        if let Some(old) = self.items.remove(key) {
            self.used -= item_size(key, &old);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), MediumError> {
        self.ensure_available()?;
        self.items.clear();
        self.used = 0;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        if !self.available {
            return Vec::new();
        }
        self.items.keys().cloned().collect()
    }
}

// == File Medium ==
/// Medium persisted as a single JSON object file.
///
/// The whole map is rewritten through a temporary file and renamed into place on
/// every mutation, so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    items: BTreeMap<String, String>,
    used: usize,
    capacity: usize,
}

impl FileMedium {
    /// Opens (or creates) the file at `path`.
    ///
    /// A file that is not a JSON string map is set aside as `<path>.corrupt` and the
    /// medium starts empty.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, MediumError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Storage file {} is unreadable ({}), starting empty", path.display(), e);
                    fs::rename(&path, path.with_extension("corrupt"))?;
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let used = items.iter().map(|(k, v)| item_size(k, v)).sum();
        Ok(Self {
            path,
            items,
            used,
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), MediumError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(&self.items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Medium for FileMedium {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        let needed = check_capacity(&self.items, self.used, self.capacity, key, value)?;
        let previous = self.items.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        self.used = needed;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        let Some(old) = self.items.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist() {
            self.items.insert(key.to_string(), old);
            return Err(e);
        }
        self.used -= item_size(key, &old);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), MediumError> {
        let previous = std::mem::take(&mut self.items);
        if let Err(e) = self.persist() {
            self.items = previous;
            return Err(e);
        }
        self.used = 0;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}
