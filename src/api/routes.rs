//! API Routes
//!
//! Configures the Axum router with all storage endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, delete_handler, get_handler, health_handler, keys_handler,
    put_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /items` - Store a value with optional TTL, obfuscation and cache tag
/// - `GET /items/:key` - Retrieve a live value
/// - `DELETE /items/:key` - Remove one key
/// - `DELETE /items?prefix=p` - Remove keys by prefix, or everything without one
/// - `GET /keys` - List stored keys
/// - `GET /stats` - Storage size and usage
/// - `POST /cleanup` - Run the expiration sweep now
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", put(put_handler).delete(clear_handler))
        .route("/items/:key", get(get_handler).delete(delete_handler))
        .route("/keys", get(keys_handler))
        .route("/stats", get(stats_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
