//! Entry Codec
//!
//! Frames a value with its metadata into the single JSON text persisted under a key:
//!
//! ```text
//! {"value": <json>, "timestamp": <ms>, "expiresAt": <ms>?, "version": "1.0.0",
//!  "encrypted": true?, "cache": true?}
//! ```
//!
//! Encrypted entries carry the obfuscated text of the value as a JSON string.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StorageError};
use crate::storage::Obfuscator;

// == Put Options ==
/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Time to live, absent means the entry never expires
    pub ttl: Option<Duration>,
    /// Obfuscate the value before framing it
    pub encrypt: bool,
    /// Mark the entry as disposable cache data
    pub cache: bool,
}

impl PutOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn encrypted() -> Self {
        Self {
            encrypt: true,
            ..Self::default()
        }
    }

    /// Cache-tagged entry with a TTL.
    pub fn cached(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            cache: true,
            ..Self::default()
        }
    }

    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

// == Stored Entry ==
/// One framed entry as persisted in the backing medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    /// The payload, or its obfuscated text when `encrypted`
    pub value: Value,
    /// Creation time (Unix milliseconds)
    pub timestamp: u64,
    /// Expiration time (Unix milliseconds), None = never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    /// Schema version at write time
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub cache: bool,
}

impl StoredEntry {
    /// Frames `value` written at `now`.
    pub fn new(
        value: Value,
        options: &PutOptions,
        now: u64,
        version: &str,
        obfuscator: &Obfuscator,
    ) -> Result<Self> {
        let value = if options.encrypt {
            let text = serde_json::to_string(&value)
                .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
            Value::String(obfuscator.obfuscate(&text))
        } else {
            value
        };

        Ok(Self {
            value,
            timestamp: now,
            expires_at: options
                .ttl
                .map(|ttl| now.saturating_add(ttl.as_millis() as u64)),
            version: version.to_string(),
            encrypted: options.encrypt,
            cache: options.cache,
        })
    }

    /// Serializes the entry to the text stored in the medium.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| StorageError::InvalidValue(e.to_string()))
    }

    /// Parses stored text. Anything that is not a framed entry is corrupt.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| StorageError::CorruptEntry(e.to_string()))
    }

    /// Expired when `now` strictly exceeds `expires_at`.
    pub fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Remaining lifetime in milliseconds, `Some(0)` once elapsed, None without a TTL.
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }

    /// Unwraps the caller's value, reversing obfuscation when needed.
    pub fn into_value(self, obfuscator: &Obfuscator) -> Result<Value> {
        if !self.encrypted {
            return Ok(self.value);
        }
        let text = match self.value {
            Value::String(text) => text,
            other => {
                return Err(StorageError::CorruptEntry(format!(
                    "encrypted entry holds a non-text value: {}",
                    other
                )))
            }
        };
        let plain = obfuscator.reveal(&text)?;
        serde_json::from_str(&plain).map_err(|e| StorageError::CorruptEntry(e.to_string()))
    }
}

/// Expiry of any stored JSON text, framed or not, for the sweep.
///
/// Text that is not JSON at all is corrupt. JSON without a numeric `expiresAt`
/// never expires, so foreign and legacy values survive the sweep.
pub(crate) fn sweep_expiry(raw: &str) -> Result<Option<u64>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| StorageError::CorruptEntry(e.to_string()))?;
    Ok(value.get("expiresAt").and_then(Value::as_u64))
}

/// Creation time of a stored entry, 0 when the text is not a framed entry.
pub(crate) fn created_at(raw: &str) -> u64 {
    #[derive(Deserialize)]
    struct Meta {
        #[serde(default)]
        timestamp: u64,
    }
    serde_json::from_str::<Meta>(raw)
        .map(|meta| meta.timestamp)
        .unwrap_or(0)
}
