//! Record store error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Identifier or `(ip_address, port)` already taken
    #[error("Game server already registered: {0}")]
    Duplicate(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// Failure reported by a store that is not backed by sqlx
    #[error("Record store error: {0}")]
    Backend(String),
}

impl DbError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::Duplicate(_))
    }
}
