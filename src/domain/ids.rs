//! Domain identifier types
//!
//! Newtype wrappers for the identifiers that flow through the pipeline.
//! Each type ensures type safety and carries its own formatting rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Message identifier assigned to a file at admission
///
/// One `MessageId` is generated per admitted file and is the identity of the
/// file's audit record for the rest of its life.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh message id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a MessageId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Message id cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the message id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Row identifier: `{message_id}#{1-based row number}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    /// Build a row id from the file's message id and a 1-based row number
    pub fn new(message_id: &MessageId, row_number: usize) -> Self {
        Self(format!("{}#{}", message_id.as_str(), row_number))
    }

    /// Returns the row id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the message id part (before the `#`)
    pub fn message_id_part(&self) -> &str {
        self.0.split('#').next().unwrap_or(&self.0)
    }

    /// Extracts the 1-based row number part, if well formed
    pub fn row_number(&self) -> Option<usize> {
        self.0.split('#').nth(1)?.parse().ok()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplier-assigned row identifier: `{unique_id}^{unique_id_uri}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    /// Combine a unique id and its owning URI
    ///
    /// Either part may be empty; presence is validated separately so that
    /// the local id can still be reported for rows that fail validation.
    pub fn new(unique_id: &str, unique_id_uri: &str) -> Self {
        Self(format!("{unique_id}^{unique_id_uri}"))
    }

    /// Returns the local id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Queue name: `{supplier}_{vaccine_type}`, the unit of serialized ordering
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Build the queue name for a supplier and vaccine type
    pub fn new(supplier: &str, vaccine_type: &str) -> Self {
        Self(format!("{supplier}_{vaccine_type}"))
    }

    /// Returns the queue name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Queue name cannot be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

/// Identifier of a stored immunisation record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh record id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a RecordId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Record id cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the record id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
