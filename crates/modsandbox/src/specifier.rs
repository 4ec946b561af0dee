//! Module specifier parsing
//!
//! A specifier names a dependency in one of three shapes:
//!
//! - `name`: bare, resolved against the preferred versions (default `latest`)
//! - `name@version`: explicitly versioned
//! - `@scope` / `@scope@version`: scoped, e.g. `@babel/core@7.0.0`
//!
//! Every shape resolves to a normalized cache key `<name>@<version>`, where the
//! name of a scoped specifier keeps its leading `@`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version used for specifiers with no explicit or preferred version
pub const DEFAULT_VERSION: &str = "latest";

/// Preferred versions keyed by request name (`lodash`, `@babel/core`)
pub type PreferredVersions = HashMap<String, String>;

/// Characters left as-is by `encodeURIComponent`
const URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Errors that can occur while parsing a specifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecifierError {
    /// Empty input
    #[error("Empty module specifier")]
    Empty,

    /// `@` or `@@1.0.0`
    #[error("Missing scope in specifier: {0}")]
    MissingScope(String),

    /// `name@` or `@scope@`
    #[error("Missing version in specifier: {0}")]
    MissingVersion(String),
}

/// A parsed module specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleSpecifier {
    /// `lodash`
    Bare { name: String },

    /// `lodash@4.17.0`
    Versioned { name: String, version: String },

    /// `@babel/core` or `@babel/core@7.0.0` (scope is `babel/core`)
    Scoped {
        scope: String,
        version: Option<String>,
    },
}

impl ModuleSpecifier {
    /// Parse a raw specifier as found in source
    pub fn parse(raw: &str) -> Result<Self, SpecifierError> {
        if raw.is_empty() {
            return Err(SpecifierError::Empty);
        }

        if let Some(rest) = raw.strip_prefix('@') {
            let (scope, version) = match rest.split_once('@') {
                Some((scope, version)) => (scope, Some(version)),
                None => (rest, None),
            };

            if scope.is_empty() {
                return Err(SpecifierError::MissingScope(raw.to_string()));
            }
            if version == Some("") {
                return Err(SpecifierError::MissingVersion(raw.to_string()));
            }

            return Ok(ModuleSpecifier::Scoped {
                scope: scope.to_string(),
                version: version.map(String::from),
            });
        }

        match raw.split_once('@') {
            None => Ok(ModuleSpecifier::Bare {
                name: raw.to_string(),
            }),
            Some((_, "")) => Err(SpecifierError::MissingVersion(raw.to_string())),
            Some((name, version)) => Ok(ModuleSpecifier::Versioned {
                name: name.to_string(),
                version: version.to_string(),
            }),
        }
    }

    /// Name sent to the bundling service (scoped names keep their `@`)
    pub fn request_name(&self) -> String {
        match self {
            ModuleSpecifier::Bare { name } | ModuleSpecifier::Versioned { name, .. } => {
                name.clone()
            }
            ModuleSpecifier::Scoped { scope, .. } => format!("@{}", scope),
        }
    }

    /// Version written in the specifier itself
    pub fn explicit_version(&self) -> Option<&str> {
        match self {
            ModuleSpecifier::Bare { .. } => None,
            ModuleSpecifier::Versioned { version, .. } => Some(version),
            ModuleSpecifier::Scoped { version, .. } => version.as_deref(),
        }
    }

    /// Pin the specifier to a concrete version
    ///
    /// Explicit versions win; otherwise the preferred version for the request
    /// name is used, falling back to [`DEFAULT_VERSION`].
    pub fn resolve(&self, preferred: &PreferredVersions) -> ResolvedModule {
        let name = self.request_name();
        let version = match self.explicit_version() {
            Some(version) => version.to_string(),
            None => preferred
                .get(&name)
                .cloned()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        };

        ResolvedModule { name, version }
    }
}

impl FromStr for ModuleSpecifier {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSpecifier::Bare { name } => write!(f, "{}", name),
            ModuleSpecifier::Versioned { name, version } => write!(f, "{}@{}", name, version),
            ModuleSpecifier::Scoped {
                scope,
                version: Some(version),
            } => write!(f, "@{}@{}", scope, version),
            ModuleSpecifier::Scoped {
                scope,
                version: None,
            } => write!(f, "@{}", scope),
        }
    }
}

/// A specifier pinned to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedModule {
    /// Request name (`lodash`, `@babel/core`)
    pub name: String,

    /// Concrete or symbolic version (`4.17.0`, `latest`)
    pub version: String,
}

impl ResolvedModule {
    /// Normalized key used by the cache and the merger
    pub fn cache_key(&self) -> String {
        cache_key(&self.name, &self.version)
    }
}

/// Build a normalized cache key
pub fn cache_key(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Scope token of a scoped cache key
///
/// `@babel/core@7.0.0` -> `babel/core`; unscoped keys return `None`.
pub fn scope_of_key(key: &str) -> Option<&str> {
    let rest = key.strip_prefix('@')?;
    rest.split('@').next().filter(|scope| !scope.is_empty())
}

/// Rewrite quoted occurrences of a versioned specifier to its bare name
///
/// `require("lodash@4.17.0")` becomes `require("lodash")`, so the executed code
/// only ever refers to modules by name.
pub fn strip_version(source: &str, raw: &str, name: &str) -> String {
    let mut rewritten = source.to_string();
    for quote in ['"', '\'', '`'] {
        let from = format!("{quote}{raw}{quote}");
        if rewritten.contains(&from) {
            rewritten = rewritten.replace(&from, &format!("{quote}{name}{quote}"));
        }
    }
    rewritten
}

/// Percent-encode a URI component (same set as JS `encodeURIComponent`)
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT_SET).to_string()
}

/// Percent-decode a URI component
pub fn decode_component(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().to_string()
}
