//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML
//! file. Each section validates itself; `VaxbatchConfig::validate` walks the
//! whole tree.

use serde::{Deserialize, Serialize};

/// Object storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process memory (tests, demos)
    Memory,
    /// Local directory tree
    Filesystem,
}

/// Permission cache backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process memory (tests, demos)
    Memory,
    /// Remote cache read endpoint over HTTP
    Http,
    /// Read the permission document straight from the config bucket
    Bucket,
}

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaxbatchConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Permission cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Forwarding configuration
    #[serde(default)]
    pub forwarding: ForwardingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VaxbatchConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.cache.validate()?;
        self.forwarding.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Default for VaxbatchConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            forwarding: ForwardingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    /// Root directory for the filesystem backend
    #[serde(default)]
    pub root_dir: Option<String>,

    /// Bucket holding submitted data files
    #[serde(default = "default_source_bucket")]
    pub source_bucket: String,

    /// Bucket acknowledgment reports are uploaded to
    #[serde(default = "default_ack_bucket")]
    pub ack_bucket: String,

    /// Bucket holding cache configuration objects
    #[serde(default = "default_config_bucket")]
    pub config_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            root_dir: None,
            source_bucket: default_source_bucket(),
            ack_bucket: default_ack_bucket(),
            config_bucket: default_config_bucket(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StorageBackend::Filesystem && self.root_dir.is_none() {
            return Err("storage.root_dir is required when storage.backend = 'filesystem'".to_string());
        }
        for (name, bucket) in [
            ("storage.source_bucket", &self.source_bucket),
            ("storage.ack_bucket", &self.ack_bucket),
            ("storage.config_bucket", &self.config_bucket),
        ] {
            if bucket.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Permission cache configuration
///
/// A stalled cache must not block unrelated file invocations, so both
/// timeouts default to well under a second and retries are bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend selection
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,

    /// Read endpoint base URL (required for the http backend)
    #[serde(default)]
    pub endpoint: String,

    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retry behaviour
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            endpoint: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == CacheBackend::Http {
            if self.endpoint.trim().is_empty() {
                return Err("cache.endpoint is required when cache.backend = 'http'".to_string());
            }
            url::Url::parse(&self.endpoint)
                .map_err(|e| format!("cache.endpoint is not a valid URL: {e}"))?;
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err("cache timeouts must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Forwarding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingConfig {
    /// Rows consumed per forwarding batch
    ///
    /// Transport detail, not a business invariant.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl ForwardingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(format!(
                "forwarding.batch_size must be between 1 and 1000, got {}",
                self.batch_size
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON logging to a rotating file
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Rotation policy (daily, hourly)
    #[serde(default = "default_log_rotation")]
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            file_path: default_log_path(),
            file_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.file_rotation.as_str()) {
            return Err(format!(
                "Invalid file_rotation '{}'. Must be one of: {}",
                self.file_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}

fn default_source_bucket() -> String {
    "data-sources".to_string()
}

fn default_ack_bucket() -> String {
    "data-destinations".to_string()
}

fn default_config_bucket() -> String {
    "config".to_string()
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Memory
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_connect_timeout_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_batch_size() -> usize {
    10
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
