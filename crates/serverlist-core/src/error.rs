//! Core error types

use serverlist_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Human-readable messages describing the failure
    pub fn messages(&self) -> Vec<String> {
        match self {
            CoreError::BadRequest(msg)
            | CoreError::Conflict(msg)
            | CoreError::Forbidden(msg)
            | CoreError::Internal(msg) => vec![msg.clone()],
            CoreError::Validation(errors) => errors.clone(),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(e: DbError) -> Self {
        match e {
            // A unique-index race lost after the pre-insert check
            DbError::Duplicate(msg) => CoreError::Conflict(msg),
            other => CoreError::Internal(other.to_string()),
        }
    }
}
