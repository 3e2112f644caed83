//! Domain error types
//!
//! This module defines the error hierarchy for the batch pipeline.
//! All errors are domain-specific and don't expose third-party types.
//!
//! Infrastructure failures (ledger, queue, store, object storage, cache) are
//! 500-class: they are logged and re-raised to the invoking event source
//! rather than being folded into a row or file outcome. Validation outcomes
//! are not errors and live in [`crate::domain::rejection`].

use thiserror::Error;

/// Main pipeline error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Permission cache errors
    #[error("Permission cache error: {0}")]
    Cache(#[from] CacheError),

    /// Audit ledger errors
    ///
    /// Losing a ledger write breaks queue ordering, so these must propagate.
    #[error("Audit ledger error: {0}")]
    Ledger(String),

    /// File queue errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Record store errors
    #[error("Record store error: {0}")]
    Store(String),

    /// Object storage errors
    #[error("Object storage error: {0}")]
    ObjectStore(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Permission-cache-specific errors
///
/// Errors that occur when talking to the distributed permission cache.
/// These errors don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache endpoint
    #[error("Failed to connect to permission cache: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Permission cache request timeout: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Permission cache server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Permission cache client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid permission cache response: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        BatchError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BatchError {
    fn from(err: toml::de::Error) -> Self {
        BatchError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_display() {
        let err = BatchError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_cache_error_conversion() {
        let cache_err = CacheError::ConnectionFailed("Network error".to_string());
        let err: BatchError = cache_err.into();
        assert!(matches!(err, BatchError::Cache(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: BatchError = io_err.into();
        assert!(matches!(err, BatchError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: BatchError = json_err.into();
        assert!(matches!(err, BatchError::Serialization(_)));
    }

    #[test]
    fn test_batch_error_implements_std_error() {
        let err = BatchError::Ledger("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
