//! Result type alias for the pipeline

use crate::domain::errors::BatchError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, BatchError>;
