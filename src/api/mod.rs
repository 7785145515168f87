//! API Module
//!
//! HTTP handlers and routing for the storage REST API.
//!
//! # Endpoints
//! - `PUT /items` - Store a value
//! - `GET /items/:key` - Retrieve a value by key
//! - `DELETE /items/:key` - Delete a key
//! - `DELETE /items` - Clear all keys, or those matching `?prefix=`
//! - `GET /keys` - List keys
//! - `GET /stats` - Storage information
//! - `POST /cleanup` - Force an expiration sweep
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
