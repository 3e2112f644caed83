//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VaxbatchConfig;
use crate::domain::errors::BatchError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VaxbatchConfig
/// 4. Applies environment variable overrides (VAXBATCH_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<VaxbatchConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BatchError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BatchError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: VaxbatchConfig = toml::from_str(&contents)
        .map_err(|e| BatchError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| BatchError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BatchError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the VAXBATCH_* prefix
///
/// Environment variables follow the pattern: VAXBATCH_<SECTION>_<KEY>
/// For example: VAXBATCH_CACHE_ENDPOINT, VAXBATCH_STORAGE_ROOT_DIR
fn apply_env_overrides(config: &mut VaxbatchConfig) {
    if let Ok(val) = std::env::var("VAXBATCH_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("VAXBATCH_STORAGE_ROOT_DIR") {
        config.storage.root_dir = Some(val);
    }
    if let Ok(val) = std::env::var("VAXBATCH_STORAGE_SOURCE_BUCKET") {
        config.storage.source_bucket = val;
    }
    if let Ok(val) = std::env::var("VAXBATCH_STORAGE_ACK_BUCKET") {
        config.storage.ack_bucket = val;
    }

    if let Ok(val) = std::env::var("VAXBATCH_CACHE_ENDPOINT") {
        config.cache.endpoint = val;
    }
    if let Ok(val) = std::env::var("VAXBATCH_CACHE_REQUEST_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.cache.request_timeout_ms = timeout;
        }
    }

    if let Ok(val) = std::env::var("VAXBATCH_FORWARDING_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.forwarding.batch_size = size;
        }
    }
}
