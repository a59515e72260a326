// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Loading, validating and saving TOML configuration files

use psychdoodle_node::config::{ConfigError, ServerConfig};
use std::fs;
use tempfile::TempDir;

const SAMPLE_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 9100
workers = 2
log_level = "debug"

[api]
require_api_key = true
api_keys = ["first", "second"]
rate_limit = 30
allowed_origins = ["https://doodles.example"]

[models]
shape_analyzer_path = ""
use_gpu = false

[storage]
type = "local"
path = "/var/lib/psychdoodle"

[monitoring]
prometheus_port = 9101
"#;

#[test]
fn test_load_sample_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, SAMPLE_CONFIG).unwrap();

    let config = ServerConfig::from_file(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.bind_address(), "127.0.0.1:9100");
    assert_eq!(config.server.workers, 2);
    assert_eq!(config.server.timeout, 60);
    assert_eq!(config.api.api_keys, vec!["first", "second"]);
    assert_eq!(config.api.rate_limit, 30);
    assert!(config.api.enable_cors);
    assert!(!config.models.use_gpu);
    assert_eq!(config.monitoring.prometheus_port, 9101);
    assert_eq!(
        config.storage.landscapes_dir(),
        std::path::Path::new("/var/lib/psychdoodle/landscapes")
    );

    let models = config.models.to_model_config();
    assert!(models.shape_model_path.is_none());
    assert!(models.drawing_model_path.is_some());
    assert!(!models.session.use_gpu);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.server.workers, ServerConfig::default().server.workers);
    assert_eq!(config.storage.storage_type, "local");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server\nport = ").unwrap();

    let err = ServerConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_wrong_type_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server]\nport = \"eight thousand\"\n").unwrap();
    assert!(ServerConfig::from_file(&path).is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[storage]\ntype = \"s3\"\ns3_bucket = \"doodles\"\n").unwrap();

    let config = ServerConfig::from_file(&path).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("config.toml");

    let mut config = ServerConfig::default();
    config.server.port = 8123;
    config.api.api_keys = vec!["k".to_string()];
    config.api.require_api_key = true;
    config.save(&path).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[server]"));
    assert!(written.contains("port = 8123"));

    let loaded = ServerConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
