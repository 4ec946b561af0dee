//! Dependency scanning
//!
//! A [`Scanner`] lists the module specifiers an entry source requires, in source
//! order. The result may contain empty strings; the orchestrator drops them.

use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

/// Errors reported by a scanner
#[derive(Debug, Error)]
pub enum ScanError {
    /// Source could not be analyzed
    #[error("Failed to scan source: {0}")]
    InvalidSource(String),
}

/// Extracts dependency specifiers from source text
pub trait Scanner: Send + Sync {
    fn scan(&self, source: &str) -> Result<Vec<String>, ScanError>;
}

/// Finds `require("...")` calls with a literal argument
///
/// Each specifier is reported once, at its first occurrence. Member calls such
/// as `loader.require("x")` and non-literal arguments are ignored. Comments are
/// not stripped, so a commented-out `require` still counts.
#[derive(Debug, Clone)]
pub struct RequireScanner {
    pattern: Regex,
}

impl RequireScanner {
    pub fn new() -> Self {
        let pattern = Regex::new(
            r#"(?:^|[^.\w$])require\s*\(\s*(?:"([^"\\\n]*)"|'([^'\\\n]*)'|`([^`\\$\n]*)`)\s*\)"#,
        )
        .expect("require pattern is valid");

        Self { pattern }
    }
}

impl Default for RequireScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for RequireScanner {
    fn scan(&self, source: &str) -> Result<Vec<String>, ScanError> {
        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        for captures in self.pattern.captures_iter(source) {
            let Some(specifier) = captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))
            else {
                continue;
            };

            if seen.insert(specifier.as_str()) {
                modules.push(specifier.as_str().to_string());
            }
        }

        Ok(modules)
    }
}
