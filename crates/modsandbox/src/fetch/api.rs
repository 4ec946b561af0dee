//! Bundling service API types
//!
//! Request and response bodies for `POST <cdn>/multi`.

use crate::cache::{CacheEntries, CacheEntry, PackageMeta};
use crate::specifier::{cache_key, decode_component};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Request body for `POST /multi`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchRequestBody {
    /// Bundling options
    pub options: FetchOptions,

    /// Dependencies to bundle (request name -> version)
    pub dependencies: IndexMap<String, String>,
}

impl FetchRequestBody {
    /// Build a request for the given dependencies
    pub fn new(dependencies: IndexMap<String, String>) -> Self {
        Self {
            options: FetchOptions { debug: true },
            dependencies,
        }
    }
}

/// Bundling options sent with every request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ask the service for source-mapped debug bundles
    pub debug: bool,
}

/// One module in a `/multi` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteEntry {
    /// Bundled module code
    pub bundle: String,

    /// Package metadata, including the resolved version
    pub package: PackageMeta,
}

/// Response from `POST /multi`, keyed by versionless (possibly encoded) name
pub type RemoteResult = IndexMap<String, RemoteEntry>;

/// Rekey a response under normalized specifiers
///
/// The service answers `{"lodash": {..., "package": {"version": "4.17.0"}}}`;
/// the cache stores that entry as `lodash@4.17.0`. Names are percent-decoded, so
/// `@babel%2Fcore` becomes `@babel/core@<version>`. The bundle text itself is
/// stored untouched.
pub fn rekey(result: RemoteResult) -> CacheEntries {
    result
        .into_iter()
        .map(|(name, entry)| {
            let key = cache_key(&decode_component(&name), &entry.package.version);
            (key, CacheEntry::new(entry.bundle, entry.package))
        })
        .collect()
}
