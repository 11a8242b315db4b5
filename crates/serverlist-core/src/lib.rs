//! Serverlist Core Business Logic
//!
//! This crate provides the heartbeat-gated server registry: the in-memory
//! liveness cache, the manager that keeps it consistent with the record
//! store, and the background sweeper that evicts silent servers.

pub mod cache;
pub mod error;
pub mod registry;
pub mod settings;

pub use cache::{CacheEntry, CachePatch, CachePatchOp, CacheStore, UNKNOWN_PLAYER_COUNT};
pub use error::CoreError;
pub use registry::{
    RegistryManager, ServerView, SweepReport, SweeperHandle, is_authorized, spawn_sweeper,
};
pub use settings::RegistrySettings;
