//! Request DTOs for the storage HTTP surface
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::storage::PutOptions;

/// Longest key accepted over HTTP
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /items
///
/// # Fields
/// - `key`: The key to store the value under
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional time to live in milliseconds (never expires if absent)
/// - `encrypt`: Obfuscate the value at rest
/// - `cache`: Mark the entry as evictable cache data
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default)]
    pub cache: bool,
}

impl PutRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be positive".to_string());
        }
        None
    }

    pub fn options(&self) -> PutOptions {
        PutOptions {
            ttl: self.ttl_ms.map(Duration::from_millis),
            encrypt: self.encrypt,
            cache: self.cache,
        }
    }
}

/// Query string for DELETE /items
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    /// Only remove keys starting with this prefix
    pub prefix: Option<String>,
}
