//! In-memory cache store

use super::{CacheEntries, CacheEntry, CacheError, CacheStore};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Process-local cache backed by an ordered map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<CacheEntries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with entries
    pub fn with_entries(entries: CacheEntries) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Look up a single entry
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self) -> Result<CacheEntries, CacheError> {
        Ok(self.entries.read().clone())
    }

    async fn put(&self, entries: CacheEntries) -> Result<(), CacheError> {
        self.entries.write().extend(entries);
        Ok(())
    }
}
