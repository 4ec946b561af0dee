//! Bundle cache
//!
//! The orchestrator reads the whole cache once per bundle call and writes back
//! only the entries it fetched. Storage is pluggable through [`CacheStore`]:
//!
//! - [`MemoryStore`]: process-local, used by tests and embedders
//! - [`FileStore`]: a JSON file at `~/.modsandbox/cache/bundles.json`
//!
//! No eviction is performed; stores keep entries until cleared.

mod entry;
mod file;
mod memory;

pub use entry::{CacheEntries, CacheEntry, PackageMeta};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Stored data could not be decoded or encoded
    #[error("Corrupt cache data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Cache directory creation failed
    #[error("Failed to create cache directory: {0}")]
    CacheInitError(String),

    /// Backend-specific failure
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value storage for bundled modules
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read every cached entry
    async fn get(&self) -> Result<CacheEntries, CacheError>;

    /// Store entries, replacing existing entries with the same key
    async fn put(&self, entries: CacheEntries) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self) -> Result<CacheEntries, CacheError> {
        (**self).get().await
    }

    async fn put(&self, entries: CacheEntries) -> Result<(), CacheError> {
        (**self).put(entries).await
    }
}
