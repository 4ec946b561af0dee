//! Sandbox configuration (sandbox.toml)
//!
//! ```toml
//! name = "preview"
//! cdn = "https://wzrd.in"
//! head = "<meta charset='utf-8'>"
//! body = "<div id='root'></div>"
//! style = "body { font-family: sans-serif; }"
//! sandbox-attributes = "allow-scripts"
//! cache-dir = "/tmp/modsandbox"
//!
//! [versions]
//! lodash = "4.17.0"
//! "@babel/core" = "7.0.0"
//! ```

use crate::fetch::DEFAULT_CDN;
use crate::specifier::PreferredVersions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name
pub const CONFIG_FILE: &str = "sandbox.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Sandbox settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct SandboxConfig {
    /// Name given to the execution surface
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Bundling service base URL
    pub cdn: String,

    /// Extra head markup
    pub head: String,

    /// Body markup placed before the script tag
    pub body: String,

    /// CSS appended to the base reset
    pub style: String,

    /// `sandbox` attribute for the execution surface
    pub sandbox_attributes: String,

    /// Cache directory (defaults to ~/.modsandbox/cache)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Preferred versions for unversioned specifiers
    pub versions: PreferredVersions,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            name: None,
            cdn: DEFAULT_CDN.to_string(),
            head: String::new(),
            body: String::new(),
            style: String::new(),
            sandbox_attributes: String::new(),
            cache_dir: None,
            versions: PreferredVersions::new(),
        }
    }
}

impl SandboxConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SandboxConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sandbox.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cdn.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "cdn cannot be empty".to_string(),
            ));
        }

        if let Some((name, _)) = self.versions.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "preferred version for '{}' cannot be empty",
                name
            )));
        }

        Ok(())
    }
}
