//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Storage sweep: runs the daily expiration sweep once it is due

mod cleanup;

pub use cleanup::spawn_cleanup_task;
