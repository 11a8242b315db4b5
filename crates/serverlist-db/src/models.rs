//! Database models

use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidRole(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidRole(s) => write!(f, "Invalid role: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Caller role carried by bearer credentials
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Operators; may act on any registered server
    Admin,
    /// Game server processes; may act only on servers they registered
    Server,
    /// Players; never act on server records
    Player,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Server => "server",
            Role::Player => "player",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether this role may register new game servers
    pub fn can_register(&self) -> bool {
        matches!(self, Role::Admin | Role::Server)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "server" => Ok(Role::Server),
            "player" => Ok(Role::Player),
            _ => Err(ParseError::InvalidRole(s.to_string())),
        }
    }
}

/// Registered game server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub max_players: i32,
    /// Principal that registered the server
    pub owner_id: String,
}

/// New game server (for insertion)
#[derive(Debug, Clone)]
pub struct NewServerRecord {
    /// Pre-assigned identifier; a UUID is generated when absent
    pub id: Option<String>,
    pub name: String,
    pub ip_address: String,
    pub port: u16,
    pub max_players: i32,
    pub owner_id: String,
}

impl NewServerRecord {
    /// Resolve the identifier and build the record that will be persisted
    pub fn into_record(self) -> ServerRecord {
        ServerRecord {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name,
            ip_address: self.ip_address,
            port: self.port,
            max_players: self.max_players,
            owner_id: self.owner_id,
        }
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for ServerRecord {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let port: i64 = row.try_get("port")?;
        Ok(ServerRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            ip_address: row.try_get("ip_address")?,
            port: u16::try_from(port).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            max_players: row.try_get("max_players")?,
            owner_id: row.try_get("owner_id")?,
        })
    }
}
