//! Registry manager implementation

use chrono::Utc;
use serverlist_db::{NewServerRecord, Role, ServerFilter, ServerRecord, ServerRecordStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::access::is_authorized;
use super::view::ServerView;
use crate::cache::{CacheEntry, CachePatch, CacheStore};
use crate::error::CoreError;
use crate::settings::RegistrySettings;

/// Message shared by "unknown server" and "not allowed" so callers cannot
/// probe which server identifiers exist.
const ACCESS_DENIED: &str = "Not authorized to access this game server";

/// Outcome of one sweep over the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries inspected
    pub scanned: usize,
    /// Servers removed from both stores
    pub evicted: usize,
    /// Cache entries removed that had no backing record
    pub orphans_removed: usize,
    /// Stale servers whose removal failed; retried next sweep
    pub failed: usize,
}

/// Result of evicting a single stale entry
enum Eviction {
    Removed,
    Orphan,
    Refreshed,
}

/// Keeps the liveness cache and the record store consistent
pub struct RegistryManager {
    store: Arc<dyn ServerRecordStore>,
    cache: Arc<CacheStore>,
    settings: RegistrySettings,
}

impl RegistryManager {
    /// Create a new registry manager
    pub fn new(
        store: Arc<dyn ServerRecordStore>,
        cache: Arc<CacheStore>,
        settings: RegistrySettings,
    ) -> Self {
        info!(
            "Initializing registry manager (heartbeat: {}, timeout: {}s, sweep interval: {}s)",
            if settings.heartbeat_enabled { "enabled" } else { "disabled" },
            settings.heartbeat_timeout_secs,
            settings.sweep_interval_secs
        );

        Self {
            store,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Clone, mutate, validate, then commit a cache entry
    fn mutate_cache<F>(&self, server_id: &str, mutate: F) -> Result<CacheEntry, CoreError>
    where
        F: FnOnce(&mut CacheEntry),
    {
        self.cache.update(server_id, |entry| {
            mutate(entry);
            entry.validate().map_err(CoreError::Validation)
        })
    }

    /// Register a new game server
    ///
    /// Fails with [`CoreError::Conflict`] when a server with the same address
    /// is already registered.
    pub async fn add_server(&self, server: NewServerRecord) -> Result<ServerRecord, CoreError> {
        let existing = self
            .store
            .find_one(&ServerFilter::address(&server.ip_address, server.port))
            .await?;
        if existing.is_some() {
            return Err(CoreError::Conflict(format!(
                "Server with address {}:{} already exists",
                server.ip_address, server.port
            )));
        }

        let record = self.store.insert(server).await?;

        self.mutate_cache(&record.id, |entry| {
            entry.last_heartbeat = Utc::now();
            entry.player_count = 0;
        })?;

        metrics::counter!("serverlist_servers_registered_total").increment(1);
        info!(
            "Registered game server {} ({}) at {}:{}",
            record.id, record.name, record.ip_address, record.port
        );
        Ok(record)
    }

    /// Remove a game server from the record store, then from the cache
    pub async fn remove_server(&self, record: &ServerRecord) -> Result<(), CoreError> {
        let deleted = self.store.delete(record).await?;
        if !deleted {
            debug!("Game server {} was already deleted", record.id);
        }

        self.cache.remove(&record.id);
        info!("Removed game server {}", record.id);
        Ok(())
    }

    /// Look up a game server and check the caller may act on it
    ///
    /// Successful access counts as a heartbeat. Unknown servers and denied
    /// callers both yield [`CoreError::Forbidden`].
    pub async fn get_if_authorized(
        &self,
        server_id: &str,
        caller_id: &str,
        caller_role: Option<Role>,
    ) -> Result<ServerRecord, CoreError> {
        let Some(role) = caller_role.filter(|_| !caller_id.trim().is_empty()) else {
            return Err(CoreError::BadRequest(
                "User id or role is null or empty".to_string(),
            ));
        };
        if server_id.trim().is_empty() {
            return Err(CoreError::BadRequest(
                "Server id is null or empty".to_string(),
            ));
        }

        let Some(record) = self.store.find_one(&ServerFilter::id(server_id)).await? else {
            debug!("Access to unknown game server {} by {}", server_id, caller_id);
            return Err(CoreError::Forbidden(ACCESS_DENIED.to_string()));
        };

        if !is_authorized(role, caller_id, &record.owner_id) {
            debug!(
                "Denied {} ({}) access to game server {}",
                caller_id,
                role.as_str(),
                record.id
            );
            return Err(CoreError::Forbidden(ACCESS_DENIED.to_string()));
        }

        self.update_heartbeat(&record.id)?;
        Ok(record)
    }

    /// Set a game server's last heartbeat to now
    pub fn update_heartbeat(&self, server_id: &str) -> Result<(), CoreError> {
        self.mutate_cache(server_id, |entry| entry.last_heartbeat = Utc::now())?;
        debug!("Heartbeat from game server {}", server_id);
        Ok(())
    }

    /// Set a game server's player count
    pub fn update_player_count(&self, server_id: &str, value: i32) -> Result<(), CoreError> {
        self.mutate_cache(server_id, |entry| entry.player_count = value)?;
        Ok(())
    }

    /// Apply a partial update to a game server's cached state
    ///
    /// The live entry only changes if the patched copy validates.
    pub fn patch_cache(&self, server_id: &str, patch: &CachePatch) -> Result<CacheEntry, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::BadRequest("Patch document is empty".to_string()));
        }

        let entry = self.mutate_cache(server_id, |entry| patch.apply_to(entry))?;
        debug!(
            "Patched cache of game server {} ({} ops)",
            server_id,
            patch.ops().len()
        );
        Ok(entry)
    }

    /// List every registered server merged with its cached state
    pub async fn list_all_views(&self) -> Result<Vec<ServerView>, CoreError> {
        let records = self.store.find_all().await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let entry = self.cache.get_or_create(&record.id);
                ServerView::new(record, &entry)
            })
            .collect())
    }

    /// Evict every server whose heartbeat is older than the timeout
    ///
    /// Failures are logged and counted per server; they never stop the sweep.
    pub async fn sweep_inactive(&self) -> SweepReport {
        let now = Utc::now();
        let timeout = self.settings.heartbeat_timeout();
        let mut report = SweepReport::default();

        // Evictions mutate the cache, so every shard lock must be released first
        let (scanned, stale) = self.cache.ids_matching(|entry| entry.is_stale(now, timeout));
        report.scanned = scanned;

        for server_id in stale {
            match self.evict(&server_id, now).await {
                Ok(Eviction::Removed) => report.evicted += 1,
                Ok(Eviction::Orphan) => report.orphans_removed += 1,
                Ok(Eviction::Refreshed) => {
                    debug!("Game server {} sent a heartbeat during sweep", server_id)
                }
                Err(e) => {
                    warn!("Failed to evict game server {}: {}", server_id, e);
                    report.failed += 1;
                }
            }
        }

        if report.evicted + report.orphans_removed > 0 {
            metrics::counter!("serverlist_servers_evicted_total")
                .increment((report.evicted + report.orphans_removed) as u64);
        }

        report
    }

    async fn evict(&self, server_id: &str, now: chrono::DateTime<Utc>) -> Result<Eviction, CoreError> {
        let timeout = self.settings.heartbeat_timeout();
        if self
            .cache
            .get(server_id)
            .is_some_and(|entry| !entry.is_stale(now, timeout))
        {
            return Ok(Eviction::Refreshed);
        }

        match self.store.find_one(&ServerFilter::id(server_id)).await? {
            Some(record) => {
                self.remove_server(&record).await?;
                Ok(Eviction::Removed)
            }
            None => {
                self.cache.remove(server_id);
                debug!("Removed orphaned cache entry {}", server_id);
                Ok(Eviction::Orphan)
            }
        }
    }
}
