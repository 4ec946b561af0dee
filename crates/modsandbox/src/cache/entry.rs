//! Cached bundle entries
//!
//! Entries are stored exactly as the bundling service returned them, keyed by
//! the normalized specifier (`lodash@4.17.0`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entries keyed by normalized specifier, in insertion order
pub type CacheEntries = IndexMap<String, CacheEntry>;

/// Package metadata reported by the bundling service
///
/// Only `version` is interpreted. Every other field (`name`, `description`,
/// `dependencies`, ...) is carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageMeta {
    /// Resolved version (semver string)
    pub version: String,

    /// Remaining package.json fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageMeta {
    /// Create metadata carrying only a version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            extra: Map::new(),
        }
    }

    /// Package name, when the service reported one
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

/// One bundled module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    /// Module code; scoped modules keep their percent-encoded scope token
    pub bundle: String,

    /// Package metadata
    pub package: PackageMeta,
}

impl CacheEntry {
    pub fn new(bundle: impl Into<String>, package: PackageMeta) -> Self {
        Self {
            bundle: bundle.into(),
            package,
        }
    }
}
