//! Bundle resolution and cache orchestration
//!
//! One [`Sandbox::bundle`] call runs:
//!
//! ```text
//! scan ─► resolve specifiers ─► read cache ─┬─► all cached ──────────────┐
//!                                           └─► fetch missing ─► put ────┤
//!                                                                        ▼
//!                                                      merge ─► assemble payload
//! ```
//!
//! Calls share nothing but the cache store. Two overlapping calls that miss the
//! same modules both fetch them and both write them; the store keeps whichever
//! write lands last.

use crate::assemble::{DeliveryPayload, ScriptAssembler};
use crate::cache::{CacheError, CacheStore, PackageMeta};
use crate::config::SandboxConfig;
use crate::error::BundleError;
use crate::events::{BundleEvent, EventSink};
use crate::fetch::{rekey, FetchRequestBody, Fetcher};
use crate::merge::BundleMerger;
use crate::scan::{RequireScanner, Scanner};
use crate::specifier::{
    strip_version, ModuleSpecifier, PreferredVersions, ResolvedModule, SpecifierError,
};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Result of a successful bundle call
#[derive(Debug)]
pub struct Bundle {
    /// Merged module code, without the entry source
    pub script: String,

    /// Metadata of every merged module, in merge order
    pub packages: Vec<PackageMeta>,

    /// Payload for the renderer
    pub payload: DeliveryPayload,

    /// Number of modules fetched from the bundling service
    pub fetched: usize,

    /// Set when fetched modules could not be persisted
    pub cache_write_error: Option<CacheError>,
}

/// Resolves an entry script's dependencies into a runnable bundle
pub struct Sandbox<C, F, S = RequireScanner> {
    cache: C,
    fetcher: F,
    scanner: S,
    assembler: ScriptAssembler,
}

impl<C: CacheStore, F: Fetcher> Sandbox<C, F> {
    /// Create a sandbox using the `require()` scanner
    pub fn new(config: &SandboxConfig, cache: C, fetcher: F) -> Self {
        Self {
            cache,
            fetcher,
            scanner: RequireScanner::new(),
            assembler: ScriptAssembler::from_config(config),
        }
    }
}

impl<C: CacheStore, F: Fetcher, S: Scanner> Sandbox<C, F, S> {
    /// Replace the dependency scanner
    pub fn with_scanner<T: Scanner>(self, scanner: T) -> Sandbox<C, F, T> {
        Sandbox {
            cache: self.cache,
            fetcher: self.fetcher,
            scanner,
            assembler: self.assembler,
        }
    }

    /// The cache store
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Bundle `entry` with its dependencies
    ///
    /// Unversioned specifiers use `preferred`, falling back to `latest`.
    /// Lifecycle events are pushed to `sink` as the call progresses.
    pub async fn bundle<K: EventSink + ?Sized>(
        &self,
        entry: &str,
        preferred: &PreferredVersions,
        sink: &mut K,
    ) -> Result<Bundle, BundleError> {
        let raw_modules: Vec<String> = self
            .scanner
            .scan(entry)?
            .into_iter()
            .filter(|module| !module.is_empty())
            .collect();

        sink.emit(BundleEvent::BundleStart);

        if raw_modules.is_empty() {
            debug!("entry has no dependencies");
            return Ok(self.complete(BundleMerger::new(), entry, 0, None, sink));
        }

        let (source, modules) = match resolve_modules(entry, &raw_modules, preferred) {
            Ok(resolved) => resolved,
            Err(err) => {
                sink.emit(BundleEvent::BundleError(err.to_string()));
                return Err(err.into());
            }
        };

        let cached = match self.cache.get().await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(error = %err, "failed to read bundle cache");
                sink.emit(BundleEvent::BundleEnd(None));
                return Err(BundleError::CacheRead(err));
            }
        };

        let mut merger = BundleMerger::new();
        let mut download = IndexMap::new();
        for (key, module) in &modules {
            match cached.get(key) {
                Some(entry) => {
                    debug!(module = %key, "cache hit");
                    merger.push(key, entry);
                }
                None => {
                    debug!(module = %key, "cache miss");
                    download.insert(module.name.clone(), module.version.clone());
                }
            }
        }

        if download.is_empty() {
            sink.emit(BundleEvent::Modules(merger.packages().to_vec()));
            return Ok(self.complete(merger, &source, 0, None, sink));
        }

        let body = FetchRequestBody::new(download);
        info!(
            cached = merger.packages().len(),
            missing = body.dependencies.len(),
            "fetching bundles"
        );

        let result = match self.fetcher.fetch(&body).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "bundle fetch failed");
                let text = err
                    .response_text()
                    .map(String::from)
                    .unwrap_or_else(|| err.to_string());
                sink.emit(BundleEvent::BundleError(text));
                return Err(err.into());
            }
        };

        let fetched = rekey(result);
        for (key, entry) in &fetched {
            merger.push(key, entry);
        }
        let fetched_count = fetched.len();

        let cache_write_error = match self.cache.put(fetched).await {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "failed to persist fetched bundles");
                Some(err)
            }
        };

        sink.emit(BundleEvent::Modules(merger.packages().to_vec()));
        Ok(self.complete(merger, &source, fetched_count, cache_write_error, sink))
    }

    fn complete<K: EventSink + ?Sized>(
        &self,
        merger: BundleMerger,
        source: &str,
        fetched: usize,
        cache_write_error: Option<CacheError>,
        sink: &mut K,
    ) -> Bundle {
        let (script, packages) = merger.finish();
        sink.emit(BundleEvent::BundleContent(script.clone()));

        let payload = self.assembler.assemble(&script, source);
        sink.emit(BundleEvent::BundleEnd(Some(payload.clone())));

        Bundle {
            script,
            packages,
            payload,
            fetched,
            cache_write_error,
        }
    }
}

/// Resolve raw specifiers, keyed and deduplicated by cache key
///
/// Returns the entry source with explicit versions stripped from its
/// unscoped specifiers.
fn resolve_modules(
    entry: &str,
    raw_modules: &[String],
    preferred: &PreferredVersions,
) -> Result<(String, IndexMap<String, ResolvedModule>), SpecifierError> {
    let mut source = entry.to_string();
    let mut modules = IndexMap::new();

    for raw in raw_modules {
        let specifier = ModuleSpecifier::parse(raw)?;
        if let ModuleSpecifier::Versioned { name, .. } = &specifier {
            source = strip_version(&source, raw, name);
        }

        let resolved = specifier.resolve(preferred);
        modules.entry(resolved.cache_key()).or_insert(resolved);
    }

    Ok((source, modules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_modules_dedups_by_key() {
        let mut preferred = PreferredVersions::new();
        preferred.insert("lodash".to_string(), "4.17.0".to_string());

        let raw = vec![
            "lodash".to_string(),
            "lodash@4.17.0".to_string(),
            "tape".to_string(),
        ];
        let entry = "require('lodash'); require('lodash@4.17.0'); require('tape')";

        let (source, modules) = resolve_modules(entry, &raw, &preferred).unwrap();
        let keys: Vec<&str> = modules.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lodash@4.17.0", "tape@latest"]);
        assert_eq!(source, "require('lodash'); require('lodash'); require('tape')");
    }

    #[test]
    fn test_resolve_modules_keeps_scoped_source() {
        let raw = vec!["@babel/core@7.0.0".to_string()];
        let entry = "require('@babel/core@7.0.0')";

        let (source, modules) = resolve_modules(entry, &raw, &PreferredVersions::new()).unwrap();
        assert_eq!(source, entry);
        assert!(modules.contains_key("@babel/core@7.0.0"));
    }
}
