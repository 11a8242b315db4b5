//! Read-only server listing view

use serde::{Deserialize, Serialize};
use serverlist_db::ServerRecord;

use crate::cache::CacheEntry;

/// Durable record fields merged with cached liveness state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerView {
    pub id: String,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub max_players: i32,
    /// Connected players, `-1` when unknown
    pub player_count: i32,
}

impl ServerView {
    pub fn new(record: ServerRecord, entry: &CacheEntry) -> Self {
        Self {
            id: record.id,
            name: record.name,
            ip_address: record.ip_address,
            port: record.port,
            max_players: record.max_players,
            player_count: entry.player_count,
        }
    }
}
