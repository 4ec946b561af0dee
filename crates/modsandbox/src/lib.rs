//! Modsandbox Library
//!
//! Turns a snippet of JavaScript into a runnable bundle for a sandboxed
//! execution surface:
//! - Dependency scanning (`require("...")` calls)
//! - Specifier resolution (bare, versioned and scoped names)
//! - Bundle caching (in-memory or on disk)
//! - Batched fetching from a browserify-style bundling CDN
//! - Script assembly and HTML rendering

pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod merge;
pub mod render;
pub mod sandbox;
pub mod scan;
pub mod specifier;

pub use assemble::{DeliveryPayload, ScriptAssembler, ScriptEncoding};
pub use cache::{CacheEntries, CacheEntry, CacheError, CacheStore, FileStore, MemoryStore, PackageMeta};
pub use config::{ConfigError, SandboxConfig};
pub use error::BundleError;
pub use events::{BundleEvent, EventSink, FnSink, NullSink};
pub use fetch::{CdnClient, FetchError, FetchRequestBody, Fetcher, RemoteEntry, RemoteResult};
pub use merge::BundleMerger;
pub use render::{HtmlRenderer, RenderError, Renderer};
pub use sandbox::{Bundle, Sandbox};
pub use scan::{RequireScanner, ScanError, Scanner};
pub use specifier::{ModuleSpecifier, PreferredVersions, ResolvedModule, SpecifierError};
