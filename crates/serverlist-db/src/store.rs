//! Record store trait

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewServerRecord, ServerRecord};

/// Lookup predicate for a single server record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFilter {
    /// Match by server identifier
    Id(String),
    /// Match by network address
    Address { ip_address: String, port: u16 },
}

impl ServerFilter {
    pub fn id(id: impl Into<String>) -> Self {
        ServerFilter::Id(id.into())
    }

    pub fn address(ip_address: impl Into<String>, port: u16) -> Self {
        ServerFilter::Address {
            ip_address: ip_address.into(),
            port,
        }
    }

    /// Check a record against this filter
    pub fn matches(&self, record: &ServerRecord) -> bool {
        match self {
            ServerFilter::Id(id) => record.id == *id,
            ServerFilter::Address { ip_address, port } => {
                record.ip_address == *ip_address && record.port == *port
            }
        }
    }
}

/// Durable storage for registered game servers
///
/// Implementations must reject a second record with the same identifier or
/// the same `(ip_address, port)` pair with [`DbError::Duplicate`].
#[async_trait]
pub trait ServerRecordStore: Send + Sync {
    /// Find the first record matching the filter
    async fn find_one(&self, filter: &ServerFilter) -> Result<Option<ServerRecord>, DbError>;

    /// List every record
    async fn find_all(&self) -> Result<Vec<ServerRecord>, DbError>;

    /// Persist a new record, generating its identifier if needed
    async fn insert(&self, record: NewServerRecord) -> Result<ServerRecord, DbError>;

    /// Delete a record, returning whether it existed
    async fn delete(&self, record: &ServerRecord) -> Result<bool, DbError>;
}
