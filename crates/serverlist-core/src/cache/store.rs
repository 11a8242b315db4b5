//! Concurrent cache store

use dashmap::DashMap;

use super::entry::CacheEntry;

/// Map from server identifier to cached liveness state
///
/// Mutations of one key are mutually exclusive; keys in different shards
/// proceed in parallel. No lock is held once a method returns, so callers
/// may freely `.await` between calls.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `id`, inserting a default one if absent
    pub fn get_or_create(&self, id: &str) -> CacheEntry {
        if let Some(entry) = self.entries.get(id) {
            return entry.value().clone();
        }
        self.entries.entry(id.to_string()).or_default().value().clone()
    }

    /// Return the entry for `id` without creating one
    pub fn get(&self, id: &str) -> Option<CacheEntry> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Mutate the entry for `id` under exclusive access
    ///
    /// A default entry is inserted first if none exists. `mutate` runs once
    /// on a copy of the entry; the copy replaces the live entry only when
    /// `mutate` succeeds, otherwise the live entry is left as it was and the
    /// error is returned. Returns the committed entry.
    pub fn update<F, E>(&self, id: &str, mutate: F) -> Result<CacheEntry, E>
    where
        F: FnOnce(&mut CacheEntry) -> Result<(), E>,
    {
        let mut slot = self.entries.entry(id.to_string()).or_default();
        let mut draft = slot.value().clone();
        mutate(&mut draft)?;
        *slot.value_mut() = draft.clone();
        Ok(draft)
    }

    /// Remove the entry for `id`, returning whether one existed
    pub fn remove(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazily iterate over copies of all entries
    ///
    /// Only one shard is read-locked at a time. Entries inserted while the
    /// iterator is alive may or may not be yielded.
    ///
    /// The iterator holds a shard read lock between items, so mutating the
    /// store from the same thread while it is alive deadlocks. Callers that
    /// go on to mutate should use [`CacheStore::ids_matching`], which
    /// releases every lock before returning.
    #[must_use = "the iterator is lazy; collect it before mutating the store"]
    pub fn snapshot(&self) -> impl Iterator<Item = (String, CacheEntry)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
    }

    /// Scan every entry and collect the ids matching `predicate`
    ///
    /// Returns the number of entries scanned alongside the matching ids.
    /// No lock is held once this returns, so the caller may mutate the
    /// store for each id.
    pub fn ids_matching<P>(&self, mut predicate: P) -> (usize, Vec<String>)
    where
        P: FnMut(&CacheEntry) -> bool,
    {
        let mut scanned = 0;
        let ids = self
            .snapshot()
            .inspect(|_| scanned += 1)
            .filter(|(_, entry)| predicate(entry))
            .map(|(id, _)| id)
            .collect();
        (scanned, ids)
    }
}
