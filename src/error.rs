//! Error Module
//!
//! Error types for the storage engine and its HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error Enum ==
/// Unified error type for the store.
///
/// Only `CapacityExceeded`, `InvalidValue` and `Medium` ever leave the store's
/// public operations. The others are recovered inside the store and logged.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Write rejected by the backing medium, after one recovery attempt
    #[error("Storage quota exceeded: {0}")]
    CapacityExceeded(String),

    /// Stored text is not a valid entry or its value cannot be revealed
    #[error("Corrupt entry: {0}")]
    CorruptEntry(String),

    /// The backing medium cannot be used at all
    #[error("Storage medium unsupported: {0}")]
    UnsupportedMedium(String),

    /// A legacy key existed but could not be moved to its new name
    #[error("Migration of '{key}' incomplete: {reason}")]
    MigrationIncomplete { key: String, reason: String },

    /// Value could not be serialized into an entry
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Backing medium failed for a reason other than capacity
    #[error("Storage medium error: {0}")]
    Medium(String),

    /// Key not present (HTTP surface only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data (HTTP surface only)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        let status = match &self {
            StorageError::NotFound(_) => StatusCode::NOT_FOUND,
            StorageError::InvalidRequest(_) | StorageError::InvalidValue(_) => {
                StatusCode::BAD_REQUEST
            }
            StorageError::CapacityExceeded(_) => StatusCode::INSUFFICIENT_STORAGE,
            StorageError::UnsupportedMedium(_) => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::CorruptEntry(_)
            | StorageError::MigrationIncomplete { .. }
            | StorageError::Medium(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, StorageError>;
