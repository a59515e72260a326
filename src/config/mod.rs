// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Defaults, then an optional TOML file, then environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::vision::{AnalysisModelConfig, SessionOptions};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub log_level: String,
    /// Request timeout in seconds
    pub timeout: u64,
    pub ssl_enabled: bool,
    pub ssl_cert: String,
    pub ssl_key: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 4,
            log_level: "info".to_string(),
            timeout: 60,
            ssl_enabled: false,
            ssl_cert: String::new(),
            ssl_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSection {
    pub enable_cors: bool,
    pub allowed_origins: Vec<String>,
    pub require_api_key: bool,
    pub api_keys: Vec<String>,
    pub rate_limit_enabled: bool,
    /// Requests per minute per client
    pub rate_limit: usize,
    /// Take the client address from `X-Forwarded-For`; only safe behind a
    /// reverse proxy that overwrites the header
    pub trust_forwarded_for: bool,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            enable_cors: true,
            allowed_origins: vec!["*".to_string()],
            require_api_key: false,
            api_keys: Vec::new(),
            rate_limit_enabled: true,
            rate_limit: 100,
            trust_forwarded_for: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelsSection {
    pub shape_analyzer_path: String,
    pub drawing_analyzer_path: String,
    pub generator_model_path: String,
    pub use_gpu: bool,
    /// MiB; 0 leaves the CUDA arena unbounded
    pub gpu_memory_limit: usize,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            shape_analyzer_path: "models/weights/shape_analyzer.onnx".to_string(),
            drawing_analyzer_path: "models/weights/drawing_analyzer.onnx".to_string(),
            generator_model_path: "models/weights/doodle_generator.onnx".to_string(),
            use_gpu: true,
            gpu_memory_limit: 2048,
        }
    }
}

impl ModelsSection {
    pub fn to_model_config(&self) -> AnalysisModelConfig {
        let optional = |path: &str| {
            let path = path.trim();
            (!path.is_empty()).then(|| path.to_string())
        };
        AnalysisModelConfig {
            shape_model_path: optional(&self.shape_analyzer_path),
            drawing_model_path: optional(&self.drawing_analyzer_path),
            generator_model_path: optional(&self.generator_model_path),
            session: SessionOptions {
                use_gpu: self.use_gpu,
                gpu_memory_limit_mb: self.gpu_memory_limit,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSection {
    /// Only "local" is served by this process
    #[serde(rename = "type")]
    pub storage_type: String,
    pub path: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            storage_type: "local".to_string(),
            path: "data/".to_string(),
        }
    }
}

impl StorageSection {
    /// Directory holding the landscape swatch images
    pub fn landscapes_dir(&self) -> PathBuf {
        Path::new(&self.path).join("landscapes")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub prometheus_enabled: bool,
    /// Separate metrics listener; 0 serves /metrics only on the main port
    pub prometheus_port: u16,
    /// Seconds between health checks
    pub health_check_interval: u64,
}

impl Default for MonitoringSection {
    fn default() -> Self {
        Self {
            enabled: true,
            prometheus_enabled: true,
            prometheus_port: 8001,
            health_check_interval: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub api: ApiSection,
    pub models: ModelsSection,
    pub storage: StorageSection,
    pub monitoring: MonitoringSection,
}

impl ServerConfig {
    /// Parse a TOML file; sections and keys left out keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// File (when present) plus environment overrides, validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config = Self::from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        } else {
            warn!(
                "Configuration file {} not found. Using default configuration.",
                path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SERVER_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(workers) = lookup("SERVER_WORKERS").and_then(|v| v.parse().ok()) {
            self.server.workers = workers;
        }
        if let Some(val) = lookup("SERVER_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Some(flag) = lookup("API_REQUIRE_KEY").and_then(|v| parse_bool(&v)) {
            self.api.require_api_key = flag;
        }
        if let Some(val) = lookup("API_KEYS") {
            self.api.api_keys = val
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(flag) = lookup("API_TRUST_FORWARDED_FOR").and_then(|v| parse_bool(&v)) {
            self.api.trust_forwarded_for = flag;
        }
        if let Some(flag) = lookup("USE_GPU").and_then(|v| parse_bool(&v)) {
            self.models.use_gpu = flag;
        }
        if let Some(limit) = lookup("GPU_MEMORY_LIMIT").and_then(|v| v.parse().ok()) {
            self.models.gpu_memory_limit = limit;
        }
        if let Some(val) = lookup("STORAGE_TYPE") {
            self.storage.storage_type = val;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".to_string()));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::Invalid(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if self.server.timeout == 0 {
            return Err(ConfigError::Invalid(
                "server.timeout must be at least 1 second".to_string(),
            ));
        }
        if self.server.ssl_enabled {
            return Err(ConfigError::Invalid(
                "server.ssl_enabled is not supported; terminate TLS at a reverse proxy"
                    .to_string(),
            ));
        }
        if self.api.require_api_key && self.api.api_keys.is_empty() {
            return Err(ConfigError::Invalid(
                "api.require_api_key is set but api.api_keys is empty".to_string(),
            ));
        }
        if self.api.rate_limit_enabled && self.api.rate_limit == 0 {
            return Err(ConfigError::Invalid(
                "api.rate_limit must be at least 1 when rate limiting is enabled".to_string(),
            ));
        }
        if self.storage.storage_type != "local" {
            return Err(ConfigError::Invalid(format!(
                "storage.type '{}' is not supported; only 'local' is available",
                self.storage.storage_type
            )));
        }
        if self.monitoring.prometheus_enabled
            && self.monitoring.prometheus_port != 0
            && self.monitoring.prometheus_port == self.server.port
        {
            return Err(ConfigError::Invalid(
                "monitoring.prometheus_port must differ from server.port".to_string(),
            ));
        }
        if self.monitoring.enabled && self.monitoring.health_check_interval == 0 {
            return Err(ConfigError::Invalid(
                "monitoring.health_check_interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the effective configuration, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
