//! API Handlers
//!
//! HTTP request handlers for each storage endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{shared, SharedStore};
use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::models::{
    ClearQuery, DeleteResponse, GetResponse, HealthResponse, KeysResponse, PutRequest,
    PutResponse, RemovedResponse,
};
use crate::storage::{FileMedium, LocalStore, Medium, MemoryMedium, StorageInfo, SystemClock};

/// Application state shared across all handlers.
///
/// Contains the store wrapped in Arc<RwLock<>> for thread-safe access.
/// Reads take the write lock too, since they may delete expired entries.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store: shared(store),
        }
    }

    /// Opens the store described by the configuration.
    ///
    /// Uses a [`FileMedium`] when `storage_path` is set, otherwise an
    /// in-memory medium of the configured capacity.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let medium: Box<dyn Medium> = match &config.storage_path {
            Some(path) => {
                info!("Opening storage file {}", path.display());
                Box::new(FileMedium::open(path, config.storage_capacity)?)
            }
            None => Box::new(MemoryMedium::new(config.storage_capacity)),
        };

        let store = LocalStore::open(medium, Arc::new(SystemClock), config.store_options());
        Ok(Self::new(store))
    }
}

/// Handler for PUT /items
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(StorageError::InvalidRequest(error_msg));
    }

    let options = req.options();
    let mut store = state.store.write().await;
    store.put_value(&req.key, req.value, options)?;

    Ok(Json(PutResponse::new(req.key)))
}

/// Handler for GET /items/:key
///
/// Absent, expired and corrupt entries all answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let mut store = state.store.write().await;
    let value = store
        .get_value(&key)
        .ok_or_else(|| StorageError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /items/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.store.write().await.delete(&key);
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /items
///
/// With `?prefix=` removes only matching keys, otherwise clears the medium.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Json<RemovedResponse> {
    let mut store = state.store.write().await;
    let removed = match query.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => Some(store.clear_by_prefix(prefix)),
        _ => {
            store.clear();
            None
        }
    };

    Json(RemovedResponse { removed })
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    let store = state.store.read().await;
    Json(KeysResponse::new(store.list_keys()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StorageInfo> {
    let store = state.store.read().await;
    Json(store.storage_info())
}

/// Handler for POST /cleanup
///
/// Runs the expiration sweep immediately, ignoring the daily schedule.
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.store.write().await.clean_expired();
    Json(RemovedResponse {
        removed: Some(removed),
    })
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let supported = state.store.read().await.is_supported();
    Json(HealthResponse::new(supported))
}
