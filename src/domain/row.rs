//! Wire messages that flow between pipeline stages
//!
//! Three message shapes connect the stages:
//! - [`FileQueueMessage`] from admission control to row processing, one per
//!   admitted file, grouped FIFO by queue name.
//! - [`RowDispatch`] from row processing to forwarding, exactly one per data
//!   row, carrying either a canonical record or a diagnostic.
//! - [`RowOutcome`] from forwarding to the acknowledgment accumulator, one
//!   per consumed row dispatch, in arrival order.

use crate::domain::ids::{LocalId, MessageId, QueueName, RecordId, RowId};
use crate::domain::record::CanonicalRecord;
use crate::domain::rejection::Diagnostic;
use crate::domain::vaccine::{Operation, VaccineType};
use serde::{Deserialize, Serialize};

/// Queue message from admission control to row processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileQueueMessage {
    pub message_id: MessageId,
    pub vaccine_type: VaccineType,
    pub supplier: String,
    pub filename: String,
    /// The supplier's full permission list, as fetched at admission time
    pub permission: Vec<String>,
    pub created_at_formatted_string: String,
}

impl FileQueueMessage {
    /// Queue this message is serialized on
    pub fn queue_name(&self) -> QueueName {
        QueueName::new(&self.supplier, self.vaccine_type.as_str())
    }
}

/// The outcome of transforming one row: a canonical record or a diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowPayload {
    /// The row transformed successfully
    #[serde(rename = "record")]
    Record(CanonicalRecord),
    /// The row failed validation or conversion
    #[serde(rename = "diagnostics")]
    Diagnostic(Diagnostic),
}

/// Outbound message dispatched for every data row
///
/// Every row produces exactly one dispatch, whatever its outcome, so the
/// acknowledgment report can account for every input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDispatch {
    pub row_id: RowId,
    pub file_key: String,
    pub supplier: String,
    pub vaccine_type: VaccineType,
    pub created_at_formatted_string: String,
    pub local_id: LocalId,
    /// Absent when the action flag itself was invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_requested: Option<Operation>,
    #[serde(flatten)]
    pub payload: RowPayload,
}

impl RowDispatch {
    /// True when this row already carries a diagnostic
    pub fn is_diagnostic(&self) -> bool {
        matches!(self.payload, RowPayload::Diagnostic(_))
    }

    /// The diagnostic, if the row failed upstream
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match &self.payload {
            RowPayload::Diagnostic(d) => Some(d),
            RowPayload::Record(_) => None,
        }
    }

    /// The canonical record, if the row transformed successfully
    pub fn record(&self) -> Option<&CanonicalRecord> {
        match &self.payload {
            RowPayload::Record(r) => Some(r),
            RowPayload::Diagnostic(_) => None,
        }
    }
}

/// Final outcome for one row, produced by forwarding
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_id: RowId,
    pub file_key: String,
    pub created_at_formatted_string: String,
    pub local_id: LocalId,
    /// True if and only if the requested operation was applied to the store
    pub delivered: bool,
    /// The failure reason, when not delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    /// Identifier of the resulting stored record, when delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
}

impl RowOutcome {
    /// A delivered outcome for the given dispatch
    pub fn delivered(dispatch: &RowDispatch, record_id: RecordId) -> Self {
        Self {
            row_id: dispatch.row_id.clone(),
            file_key: dispatch.file_key.clone(),
            created_at_formatted_string: dispatch.created_at_formatted_string.clone(),
            local_id: dispatch.local_id.clone(),
            delivered: true,
            diagnostic: None,
            record_id: Some(record_id),
        }
    }

    /// A failed outcome for the given dispatch
    pub fn failed(dispatch: &RowDispatch, diagnostic: Diagnostic) -> Self {
        Self {
            row_id: dispatch.row_id.clone(),
            file_key: dispatch.file_key.clone(),
            created_at_formatted_string: dispatch.created_at_formatted_string.clone(),
            local_id: dispatch.local_id.clone(),
            delivered: false,
            diagnostic: Some(diagnostic),
            record_id: None,
        }
    }
}
