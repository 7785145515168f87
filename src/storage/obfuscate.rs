//! Obfuscator
//!
//! Reversible XOR scrambling for values written with `encrypt: true`.
//!
//! This is NOT encryption. The key is a constant, the transform is its own inverse
//! and anyone with the stored text can recover the value. It only keeps
//! credential-like values from being readable at a glance.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::StorageError;

/// Default repeating XOR key.
pub const DEFAULT_OBFUSCATION_KEY: &str = "movie_app_secret_key_2024";

#[derive(Debug, Clone)]
pub struct Obfuscator {
    key: Vec<u8>,
}

impl Obfuscator {
    /// Creates an obfuscator with the given key. An empty key falls back to the default.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        if key.is_empty() {
            return Self::default();
        }
        Self { key }
    }

    /// Scrambles `plain` and returns it as base64 text.
    pub fn obfuscate(&self, plain: &str) -> String {
        STANDARD.encode(self.xor(plain.as_bytes()))
    }

    /// Inverse of [`Obfuscator::obfuscate`].
    pub fn reveal(&self, encoded: &str) -> Result<String, StorageError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| StorageError::CorruptEntry(format!("bad obfuscated text: {}", e)))?;
        String::from_utf8(self.xor(&bytes))
            .map_err(|e| StorageError::CorruptEntry(format!("obfuscated text is not UTF-8: {}", e)))
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

impl Default for Obfuscator {
    fn default() -> Self {
        Self {
            key: DEFAULT_OBFUSCATION_KEY.as_bytes().to_vec(),
        }
    }
}
