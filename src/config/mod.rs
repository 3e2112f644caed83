//! Configuration management
//!
//! Configuration is a TOML file with `${VAR}` substitution and
//! `VAXBATCH_*` environment overrides, validated on load.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CacheBackend, CacheConfig, ForwardingConfig, LoggingConfig, RetryConfig,
    StorageBackend, StorageConfig, VaxbatchConfig,
};
