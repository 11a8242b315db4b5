//! Server liveness cache

mod entry;
mod patch;
mod store;

pub use entry::{CacheEntry, MAX_CLOCK_SKEW_SECS, UNKNOWN_PLAYER_COUNT};
pub use patch::{CachePatch, CachePatchOp};
pub use store::CacheStore;
