//! Integration tests for sandbox configuration
//!
//! Tests SandboxConfig with realistic sandbox.toml files.

use modsandbox::{ConfigError, SandboxConfig};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_full_config() {
    let toml = r#"
name = "preview"
cdn = "http://localhost:9999"
head = "<meta charset='utf-8'>"
body = "<div id='root'></div>"
style = "body { background: #fff; }"
sandbox-attributes = "allow-scripts allow-same-origin"
cache-dir = "/tmp/modsandbox-cache"

[versions]
lodash = "4.17.0"
"@babel/core" = "7.0.0"
"#;

    let config = SandboxConfig::parse(toml).unwrap();
    assert_eq!(config.name.as_deref(), Some("preview"));
    assert_eq!(config.cdn, "http://localhost:9999");
    assert_eq!(config.head, "<meta charset='utf-8'>");
    assert_eq!(config.body, "<div id='root'></div>");
    assert_eq!(config.style, "body { background: #fff; }");
    assert_eq!(config.sandbox_attributes, "allow-scripts allow-same-origin");
    assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/modsandbox-cache")));
    assert_eq!(config.versions.get("lodash"), Some(&"4.17.0".to_string()));
    assert_eq!(config.versions.get("@babel/core"), Some(&"7.0.0".to_string()));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = SandboxConfig::parse("style = \"p { margin: 0; }\"").unwrap();
    assert_eq!(config.cdn, modsandbox::fetch::DEFAULT_CDN);
    assert!(config.name.is_none());
    assert!(config.versions.is_empty());
}

#[test]
fn test_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    std::fs::write(&path, "name = \"from-file\"").unwrap();

    let config = SandboxConfig::from_file(&path).unwrap();
    assert_eq!(config.name.as_deref(), Some("from-file"));
}

#[test]
fn test_from_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = SandboxConfig::from_file(&temp.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

#[test]
fn test_discover() {
    let temp = TempDir::new().unwrap();
    assert_eq!(
        SandboxConfig::discover(temp.path()).unwrap(),
        SandboxConfig::default()
    );

    std::fs::write(temp.path().join("sandbox.toml"), "name = \"found\"").unwrap();
    let config = SandboxConfig::discover(temp.path()).unwrap();
    assert_eq!(config.name.as_deref(), Some("found"));
}

#[test]
fn test_serialize_round_trip() {
    let mut config = SandboxConfig::default();
    config.name = Some("preview".to_string());
    config.versions.insert("lodash".to_string(), "4.17.0".to_string());

    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("sandbox-attributes"));
    assert_eq!(SandboxConfig::parse(&text).unwrap(), config);
}
