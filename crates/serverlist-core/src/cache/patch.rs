//! Partial updates for cached server state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::{CacheEntry, UNKNOWN_PLAYER_COUNT};

/// A single field-level operation on a [`CacheEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CachePatchOp {
    /// Replace the player count
    SetPlayerCount { value: i32 },
    /// Reset the player count to unknown
    ClearPlayerCount,
    /// Replace the last heartbeat timestamp
    SetLastHeartbeat { value: DateTime<Utc> },
}

/// Ordered list of operations applied as one unit
///
/// Serialized as a bare JSON array, e.g.
/// `[{"op": "set_player_count", "value": 12}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachePatch {
    ops: Vec<CachePatchOp>,
}

impl CachePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation (builder style)
    pub fn with(mut self, op: CachePatchOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn push(&mut self, op: CachePatchOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[CachePatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every operation in order. Does not validate the result.
    pub fn apply_to(&self, entry: &mut CacheEntry) {
        for op in &self.ops {
            match op {
                CachePatchOp::SetPlayerCount { value } => entry.player_count = *value,
                CachePatchOp::ClearPlayerCount => entry.player_count = UNKNOWN_PLAYER_COUNT,
                CachePatchOp::SetLastHeartbeat { value } => entry.last_heartbeat = *value,
            }
        }
    }
}

impl From<Vec<CachePatchOp>> for CachePatch {
    fn from(ops: Vec<CachePatchOp>) -> Self {
        Self { ops }
    }
}
