//! Integration tests for the on-disk bundle cache
//!
//! Each test works in its own temporary cache directory.

use async_trait::async_trait;
use modsandbox::{
    CacheEntries, CacheEntry, CacheStore, FetchError, FetchRequestBody, Fetcher, FileStore,
    NullSink, PackageMeta, PreferredVersions, RemoteEntry, RemoteResult, Sandbox, SandboxConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn entries(pairs: &[(&str, &str, &str)]) -> CacheEntries {
    pairs
        .iter()
        .map(|(key, bundle, version)| {
            (
                key.to_string(),
                CacheEntry::new(*bundle, PackageMeta::new(*version)),
            )
        })
        .collect()
}

/// Answers every requested dependency with a bundle naming it
#[derive(Default)]
struct EchoFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for EchoFetcher {
    async fn fetch(&self, body: &FetchRequestBody) -> Result<RemoteResult, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(body
            .dependencies
            .keys()
            .map(|name| {
                let entry = RemoteEntry {
                    bundle: format!("/*{}*/", name),
                    package: PackageMeta::new("1.0.0"),
                };
                (name.clone(), entry)
            })
            .collect())
    }
}

#[tokio::test]
async fn test_put_and_get() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());

    store
        .put(entries(&[("lodash@4.17.0", "/*lodash*/", "4.17.0")]))
        .await
        .unwrap();

    let cached = store.get().await.unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached["lodash@4.17.0"].bundle, "/*lodash*/");
    assert_eq!(cached["lodash@4.17.0"].package.version, "4.17.0");
    assert!(store.bundles_path().exists());
}

#[tokio::test]
async fn test_put_merges_with_existing_entries() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());

    store
        .put(entries(&[("a@1.0.0", "old", "1.0.0"), ("b@1.0.0", "b", "1.0.0")]))
        .await
        .unwrap();
    store
        .put(entries(&[("a@1.0.0", "new", "1.0.0"), ("c@1.0.0", "c", "1.0.0")]))
        .await
        .unwrap();

    let cached = store.get().await.unwrap();
    let keys: Vec<&str> = cached.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a@1.0.0", "b@1.0.0", "c@1.0.0"]);
    assert_eq!(cached["a@1.0.0"].bundle, "new");
}

#[tokio::test]
async fn test_entries_persist_across_store_instances() {
    let temp = TempDir::new().unwrap();

    FileStore::new(temp.path())
        .put(entries(&[("@babel/core@7.0.0", "/*babel%2Fcore*/", "7.0.0")]))
        .await
        .unwrap();

    let reopened = FileStore::new(temp.path());
    let cached = reopened.get().await.unwrap();
    assert_eq!(cached["@babel/core@7.0.0"].bundle, "/*babel%2Fcore*/");
}

#[tokio::test]
async fn test_no_staging_files_left_behind() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());

    store
        .put(entries(&[("a@1.0.0", "a", "1.0.0")]))
        .await
        .unwrap();

    let staged = std::fs::read_dir(temp.path().join("tmp")).unwrap().count();
    assert_eq!(staged, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_puts_from_separate_stores() {
    let temp = TempDir::new().unwrap();
    let left = FileStore::new(temp.path());
    let right = FileStore::new(temp.path());
    let bundle = "x".repeat(200 * 1024);

    for round in 0..50 {
        let left_key = format!("left@{}.0.0", round);
        let right_key = format!("right@{}.0.0", round);
        let (a, b) = tokio::join!(
            left.put(entries(&[(left_key.as_str(), bundle.as_str(), "1.0.0")])),
            right.put(entries(&[(right_key.as_str(), bundle.as_str(), "1.0.0")])),
        );
        a.unwrap();
        b.unwrap();
    }

    // Merges may race, but the file always holds a complete write
    let cached = left.get().await.unwrap();
    assert!(!cached.is_empty());

    let staged = std::fs::read_dir(temp.path().join("tmp")).unwrap().count();
    assert_eq!(staged, 0);
}

#[tokio::test]
async fn test_sandbox_reuses_file_cache_across_instances() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(EchoFetcher::default());
    let entry = "require('left-pad@1.0.0'); require('@scope/pkg@1.0.0');";

    let first = Sandbox::new(
        &SandboxConfig::default(),
        FileStore::new(temp.path()),
        fetcher.clone(),
    );
    let a = first
        .bundle(entry, &PreferredVersions::new(), &mut NullSink)
        .await
        .unwrap();
    assert_eq!(a.fetched, 2);

    let second = Sandbox::new(
        &SandboxConfig::default(),
        FileStore::new(temp.path()),
        fetcher.clone(),
    );
    let b = second
        .bundle(entry, &PreferredVersions::new(), &mut NullSink)
        .await
        .unwrap();

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(b.fetched, 0);
    assert_eq!(a.script, b.script);
    assert_eq!(a.script, "/*left-pad*//*@scope/pkg*/");
}
