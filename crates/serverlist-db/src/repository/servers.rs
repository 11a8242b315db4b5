//! Game server record operations

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewServerRecord, ServerRecord};
use crate::repository::Database;
use crate::store::{ServerFilter, ServerRecordStore};

/// Map a unique-index violation to [`DbError::Duplicate`]
fn map_insert_error(e: sqlx::Error, record: &ServerRecord) -> DbError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Duplicate(
            format!(
                "Server '{}' at {}:{} already exists",
                record.id, record.ip_address, record.port
            ),
        ),
        _ => DbError::Sqlx(e),
    }
}

impl Database {
    // ==================== Game Server Operations ====================

    /// Insert a new game server record
    pub async fn insert_server(&self, record: NewServerRecord) -> Result<ServerRecord, DbError> {
        let record = record.into_record();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO game_servers (id, name, ip_address, port, max_players, owner_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.ip_address)
        .bind(record.port as i64)
        .bind(record.max_players)
        .bind(&record.owner_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &record))?;

        debug!("Inserted game server {}", record.id);
        Ok(record)
    }

    /// Get a game server by ID
    pub async fn get_server_by_id(&self, id: &str) -> Result<Option<ServerRecord>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, ip_address, port, max_players, owner_id
            FROM game_servers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| ServerRecord::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a game server by its network address
    pub async fn get_server_by_address(
        &self,
        ip_address: &str,
        port: u16,
    ) -> Result<Option<ServerRecord>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, ip_address, port, max_players, owner_id
            FROM game_servers
            WHERE ip_address = ? AND port = ?
            "#,
        )
        .bind(ip_address)
        .bind(port as i64)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| ServerRecord::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List all game servers
    pub async fn list_servers(&self) -> Result<Vec<ServerRecord>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, ip_address, port, max_players, owner_id
            FROM game_servers
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| ServerRecord::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete a game server
    pub async fn delete_server(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM game_servers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ServerRecordStore for Database {
    async fn find_one(&self, filter: &ServerFilter) -> Result<Option<ServerRecord>, DbError> {
        match filter {
            ServerFilter::Id(id) => self.get_server_by_id(id).await,
            ServerFilter::Address { ip_address, port } => {
                self.get_server_by_address(ip_address, *port).await
            }
        }
    }

    async fn find_all(&self) -> Result<Vec<ServerRecord>, DbError> {
        self.list_servers().await
    }

    async fn insert(&self, record: NewServerRecord) -> Result<ServerRecord, DbError> {
        self.insert_server(record).await
    }

    async fn delete(&self, record: &ServerRecord) -> Result<bool, DbError> {
        self.delete_server(&record.id).await
    }
}
