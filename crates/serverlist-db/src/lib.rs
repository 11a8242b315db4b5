//! Serverlist Database Layer
//!
//! This crate provides the durable record store for registered game servers.
//! Records live in SQLite via sqlx, or in process memory for tests and
//! throwaway deployments. Both backends implement [`ServerRecordStore`].

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use memory::MemoryStore;
pub use models::*;
pub use repository::Database;
pub use store::{ServerFilter, ServerRecordStore};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
