//! Cached liveness record

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Player count of a server that has never reported one
pub const UNKNOWN_PLAYER_COUNT: i32 = -1;

/// Tolerated clock difference for heartbeats reported by game servers
pub const MAX_CLOCK_SKEW_SECS: i64 = 5;

/// In-memory state of a registered game server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Time of the last heartbeat, or of creation if none was received
    pub last_heartbeat: DateTime<Utc>,
    /// Connected players; [`UNKNOWN_PLAYER_COUNT`] until reported
    pub player_count: i32,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            last_heartbeat: Utc::now(),
            player_count: UNKNOWN_PLAYER_COUNT,
        }
    }
}

impl CacheEntry {
    /// Check field constraints against the current time
    pub fn validate(&self) -> Result<(), Vec<String>> {
        self.validate_at(Utc::now())
    }

    /// Check field constraints against `now`
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.player_count < UNKNOWN_PLAYER_COUNT {
            errors.push(format!(
                "player_count must be at least {}, got {}",
                UNKNOWN_PLAYER_COUNT, self.player_count
            ));
        }
        if self.last_heartbeat > now + TimeDelta::seconds(MAX_CLOCK_SKEW_SECS) {
            errors.push("last_heartbeat cannot be in the future".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether more than `timeout` elapsed between the last heartbeat and `now`
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        now.signed_duration_since(self.last_heartbeat) > timeout
    }
}
