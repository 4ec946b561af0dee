//! On-disk cache store
//!
//! Directory structure:
//! ```text
//! ~/.modsandbox/cache/
//! ├── bundles.json     # { "<name>@<version>": { "bundle": ..., "package": ... } }
//! └── tmp/             # staging area for atomic writes
//! ```

use super::{CacheEntries, CacheError, CacheStore};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task;

const BUNDLES_FILE: &str = "bundles.json";

/// JSON-file cache store
///
/// `put` merges into the existing file under a lock owned by this store, so
/// concurrent bundle calls sharing one `FileStore` do not drop each other's
/// entries. Separate stores on the same root never see a partially written
/// file, but their merges may race and the last write wins.
#[derive(Debug)]
pub struct FileStore {
    /// Root cache directory
    root: PathBuf,

    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store rooted at `root`
    ///
    /// Directories are created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store at ~/.modsandbox/cache/
    pub fn default_store() -> Result<Self, CacheError> {
        Ok(Self::new(Self::default_dir()?))
    }

    /// Default cache directory (~/.modsandbox/cache/)
    pub fn default_dir() -> Result<PathBuf, CacheError> {
        let home = dirs::home_dir().ok_or_else(|| {
            CacheError::CacheInitError("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".modsandbox").join("cache"))
    }

    /// Get the cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the bundles file
    pub fn bundles_path(&self) -> PathBuf {
        self.root.join(BUNDLES_FILE)
    }

    /// Remove every cached bundle
    pub async fn clear(&self) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.bundles_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self) -> Result<CacheEntries, CacheError> {
        let bytes = match fs::read(self.bundles_path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheEntries::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, entries: &CacheEntries) -> Result<(), CacheError> {
        let data = serde_json::to_vec(entries)?;

        let tmp_dir = self.root.join("tmp");
        fs::create_dir_all(&tmp_dir).await?;
        let target = self.bundles_path();

        // Stage under a unique name, then rename over the bundles file
        task::spawn_blocking(move || -> Result<(), CacheError> {
            let mut staged = NamedTempFile::new_in(&tmp_dir)?;
            staged.write_all(&data)?;
            staged.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Unavailable(format!("cache writer panicked: {}", e)))?
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self) -> Result<CacheEntries, CacheError> {
        self.load().await
    }

    async fn put(&self, entries: CacheEntries) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.load().await?;
        stored.extend(entries);
        self.save(&stored).await?;

        tracing::debug!(
            path = %self.bundles_path().display(),
            total = stored.len(),
            "bundle cache written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, PackageMeta};
    use tempfile::TempDir;

    #[test]
    fn test_bundles_path() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        assert_eq!(store.bundles_path(), temp.path().join("bundles.json"));
    }

    #[tokio::test]
    async fn test_get_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("never-created"));
        assert!(store.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bundles.json"), b"{not json").unwrap();

        let store = FileStore::new(temp.path());
        assert!(matches!(store.get().await, Err(CacheError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        let mut entries = CacheEntries::new();
        entries.insert(
            "lodash@4.17.0".to_string(),
            CacheEntry::new("/*lodash*/", PackageMeta::new("4.17.0")),
        );
        store.put(entries).await.unwrap();
        assert_eq!(store.get().await.unwrap().len(), 1);

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_empty());

        // Clearing twice is fine
        store.clear().await.unwrap();
    }
}
