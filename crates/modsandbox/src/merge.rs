//! Bundle merging
//!
//! Fragments are appended in resolution order: cache hits in discovery order,
//! then fetched modules in the order the service listed them.

use crate::cache::{CacheEntry, PackageMeta};
use crate::specifier::{encode_component, scope_of_key};
use std::borrow::Cow;

/// Accumulates bundle text and package metadata for one bundle call
#[derive(Debug, Default)]
pub struct BundleMerger {
    script: String,
    packages: Vec<PackageMeta>,
}

impl BundleMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the entry stored under `key`
    pub fn push(&mut self, key: &str, entry: &CacheEntry) {
        self.script.push_str(&decode_fragment(key, &entry.bundle));
        self.packages.push(entry.package.clone());
    }

    /// Package metadata so far, in merge order
    pub fn packages(&self) -> &[PackageMeta] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn finish(self) -> (String, Vec<PackageMeta>) {
        (self.script, self.packages)
    }
}

/// Restore the literal scope inside a scoped module's bundle text
///
/// The service addresses `@babel/core` as `@babel%2Fcore`, and the bundle text
/// refers to itself the same way. The first encoded occurrence is replaced by
/// the literal scope so the fragment answers to the specifier used in source.
/// Unscoped fragments are returned as-is.
pub fn decode_fragment<'a>(key: &str, bundle: &'a str) -> Cow<'a, str> {
    let Some(scope) = scope_of_key(key) else {
        return Cow::Borrowed(bundle);
    };

    let encoded = encode_component(scope);
    if encoded == scope || !bundle.contains(&encoded) {
        return Cow::Borrowed(bundle);
    }

    Cow::Owned(bundle.replacen(&encoded, scope, 1))
}
