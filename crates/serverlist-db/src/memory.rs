//! In-memory record store

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewServerRecord, ServerRecord};
use crate::store::{ServerFilter, ServerRecordStore};

/// Record store kept in process memory
///
/// Records are enumerated in insertion order. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ServerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServerRecordStore for MemoryStore {
    async fn find_one(&self, filter: &ServerFilter) -> Result<Option<ServerRecord>, DbError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| filter.matches(r))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<ServerRecord>, DbError> {
        Ok(self.records.read().clone())
    }

    async fn insert(&self, record: NewServerRecord) -> Result<ServerRecord, DbError> {
        let record = record.into_record();
        let mut records = self.records.write();

        if records.iter().any(|r| r.id == record.id) {
            return Err(DbError::Duplicate(format!(
                "Server '{}' already exists",
                record.id
            )));
        }
        if records
            .iter()
            .any(|r| r.ip_address == record.ip_address && r.port == record.port)
        {
            return Err(DbError::Duplicate(format!(
                "Server at {}:{} already exists",
                record.ip_address, record.port
            )));
        }

        debug!("Stored server record {} in memory", record.id);
        records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, record: &ServerRecord) -> Result<bool, DbError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != record.id);
        Ok(records.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(ip: &str, port: u16) -> NewServerRecord {
        NewServerRecord {
            id: None,
            name: "test".to_string(),
            ip_address: ip.to_string(),
            port,
            max_players: 8,
            owner_id: "owner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let record = store.insert(new_record("10.0.0.1", 7000)).await.unwrap();

        let by_id = store.find_one(&ServerFilter::id(&record.id)).await.unwrap();
        assert_eq!(by_id, Some(record.clone()));

        let by_addr = store
            .find_one(&ServerFilter::address("10.0.0.1", 7000))
            .await
            .unwrap();
        assert_eq!(by_addr, Some(record));

        let missing = store
            .find_one(&ServerFilter::address("10.0.0.1", 7001))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_address_rejected() {
        let store = MemoryStore::new();
        store.insert(new_record("10.0.0.1", 7000)).await.unwrap();

        let result = store.insert(new_record("10.0.0.1", 7000)).await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_reported() {
        let store = MemoryStore::new();
        let record = store.insert(new_record("10.0.0.1", 7000)).await.unwrap();

        assert!(store.delete(&record).await.unwrap());
        assert!(!store.delete(&record).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
