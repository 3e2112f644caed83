//! Typed validation outcomes
//!
//! Validation failures are values, not raised errors: each stage of the
//! pipeline returns `Result<T, FileRejection>` or attaches a [`Diagnostic`]
//! to the affected row. A file rejection aborts the whole file (one
//! summarizing acknowledgment, queue still advanced); a diagnostic marks a
//! single row as failed while its siblings continue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasons a whole file is rejected before any row is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileRejectionKind {
    /// The file key does not match the expected naming convention,
    /// or one of its segments (including the ODS code) is invalid
    InvalidFileKey,
    /// The supplier holds no permission at all for the requested vaccine type
    VaccineTypePermission,
    /// The supplier holds no permission for any of the operations the file requests
    NoOperationPermission,
    /// The header row does not match the expected column set exactly
    InvalidHeaders,
    /// A file with the same name has already been submitted
    DuplicateFile,
}

impl FileRejectionKind {
    /// HTTP-style status code class for this rejection
    pub fn status_code(&self) -> u16 {
        match self {
            FileRejectionKind::InvalidFileKey => 400,
            FileRejectionKind::VaccineTypePermission => 403,
            FileRejectionKind::NoOperationPermission => 403,
            FileRejectionKind::InvalidHeaders => 400,
            FileRejectionKind::DuplicateFile => 422,
        }
    }
}

/// A file-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRejection {
    /// What class of failure occurred
    pub kind: FileRejectionKind,
    /// Human-readable detail for logs and the acknowledgment file
    pub message: String,
}

impl FileRejection {
    /// Create a new file rejection
    pub fn new(kind: FileRejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// HTTP-style status code class for this rejection
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Reasons a single row fails while the rest of the file continues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// Action flag is not one of NEW, UPDATE, DELETE
    InvalidActionFlag,
    /// The supplier is not permitted to perform this row's operation
    NoOperationPermission,
    /// UNIQUE_ID or UNIQUE_ID_URI is absent
    MissingUniqueId,
    /// The row could not be converted to a canonical record
    InvalidConversion,
    /// The canonical record failed business-rule validation
    RuleViolation,
    /// Another non-deleted record already carries this identifier pair
    DuplicateIdentifier,
    /// No existing non-deleted record to update or delete
    ResourceNotFound,
    /// An infrastructure call failed while handling this row
    Unhandled,
}

impl DiagnosticKind {
    /// HTTP-style status code class for this diagnostic
    pub fn status_code(&self) -> u16 {
        match self {
            DiagnosticKind::InvalidActionFlag => 400,
            DiagnosticKind::NoOperationPermission => 403,
            DiagnosticKind::MissingUniqueId => 400,
            DiagnosticKind::InvalidConversion => 400,
            DiagnosticKind::RuleViolation => 400,
            DiagnosticKind::DuplicateIdentifier => 422,
            DiagnosticKind::ResourceNotFound => 404,
            DiagnosticKind::Unhandled => 500,
        }
    }
}

/// A structured failure reason attached to a single row
///
/// Diagnostics travel on the outbound row message and end up in the
/// OPERATION_OUTCOME column of the acknowledgment report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What class of failure occurred
    #[serde(rename = "error_type")]
    pub kind: DiagnosticKind,
    /// HTTP-style status code class, derived from the kind
    pub status_code: u16,
    /// Human-readable detail for the acknowledgment file
    #[serde(rename = "error_message")]
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic; the status code is derived from the kind
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: kind.status_code(),
            message: message.into(),
        }
    }

    /// Invalid action flag, with the canonical message text
    pub fn invalid_action_flag() -> Self {
        Self::new(
            DiagnosticKind::InvalidActionFlag,
            "Invalid ACTION_FLAG - ACTION_FLAG must be 'NEW', 'UPDATE' or 'DELETE'",
        )
    }

    /// No permission for the requested operation, with the canonical message text
    pub fn no_operation_permission() -> Self {
        Self::new(
            DiagnosticKind::NoOperationPermission,
            "No permissions for requested operation",
        )
    }

    /// Missing unique identifier, with the canonical message text
    pub fn missing_unique_id() -> Self {
        Self::new(
            DiagnosticKind::MissingUniqueId,
            "UNIQUE_ID or UNIQUE_ID_URI is missing",
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
