//! Bundle call errors

use crate::cache::CacheError;
use crate::fetch::FetchError;
use crate::scan::ScanError;
use crate::specifier::SpecifierError;
use thiserror::Error;

/// Terminal failure of one bundle call
///
/// Cache write failures are not listed here: they never abort a call and are
/// reported on [`Bundle::cache_write_error`](crate::Bundle::cache_write_error).
#[derive(Debug, Error)]
pub enum BundleError {
    /// The scanner rejected the entry source
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// A discovered specifier is malformed
    #[error("Specifier error: {0}")]
    Specifier(#[from] SpecifierError),

    /// The cache could not be read
    #[error("Cache read error: {0}")]
    CacheRead(#[source] CacheError),

    /// The bundling service request failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}
