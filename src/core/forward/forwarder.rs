//! Forwarding and persistence
//!
//! Consumes batches of dispatched row messages and applies each row's
//! operation to the record store, producing one [`RowOutcome`] per consumed
//! message in arrival order. Rows that already carry a diagnostic pass
//! straight through; record rows are re-validated against the business rules
//! and then applied through an exhaustive operation match.
//!
//! Identifier uniqueness is enforced twice: the store's conditional insert
//! is the authoritative atomic check, and a batch-local deduplication set
//! catches a second occurrence of the same identifier pair within one batch
//! before it reaches the store.

use crate::adapters::store::{DeleteOutcome, InsertOutcome, RecordStore, UpdateOutcome};
use crate::core::forward::rules::validate_record;
use crate::domain::{
    CanonicalRecord, Diagnostic, DiagnosticKind, Operation, Result, RowDispatch, RowOutcome,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Diagnostic text when an infrastructure call fails mid-row
const UNHANDLED_MESSAGE: &str = "An unhandled error occurred during batch processing";

/// Forwarding and persistence stage
pub struct RowForwarder {
    store: Arc<dyn RecordStore>,
}

impl RowForwarder {
    /// Create a new forwarder over a record store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Forward one batch of row messages
    ///
    /// Returns one outcome per input message, in arrival order. Store
    /// failures become 500-class diagnostics on the affected row; sibling
    /// rows continue.
    pub async fn forward_batch(&self, batch: &[RowDispatch]) -> Vec<RowOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        // Identifier pairs already created within this batch
        let mut created_in_batch: HashSet<(String, String)> = HashSet::new();

        for dispatch in batch {
            let outcome = self.forward_row(dispatch, &mut created_in_batch).await;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn forward_row(
        &self,
        dispatch: &RowDispatch,
        created_in_batch: &mut HashSet<(String, String)>,
    ) -> RowOutcome {
        tracing::info!(row_id = %dispatch.row_id, "Forwarding row");

        // Upstream diagnostics pass through without touching the store
        if let Some(diagnostic) = dispatch.diagnostic() {
            return RowOutcome::failed(dispatch, diagnostic.clone());
        }

        let Some(record) = dispatch.record() else {
            // A dispatch must carry a record or a diagnostic; this is a
            // malformed message rather than a supplier error
            return RowOutcome::failed(
                dispatch,
                Diagnostic::new(DiagnosticKind::Unhandled, UNHANDLED_MESSAGE),
            );
        };
        let Some(operation) = dispatch.operation_requested else {
            return RowOutcome::failed(
                dispatch,
                Diagnostic::new(DiagnosticKind::Unhandled, UNHANDLED_MESSAGE),
            );
        };

        if let Err(diagnostic) = validate_record(record) {
            return RowOutcome::failed(dispatch, diagnostic);
        }

        match self
            .apply_operation(operation, record, dispatch, created_in_batch)
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(
                    row_id = %dispatch.row_id,
                    error = %error,
                    "Store operation failed"
                );
                RowOutcome::failed(
                    dispatch,
                    Diagnostic::new(DiagnosticKind::Unhandled, UNHANDLED_MESSAGE),
                )
            }
        }
    }

    async fn apply_operation(
        &self,
        operation: Operation,
        record: &CanonicalRecord,
        dispatch: &RowDispatch,
        created_in_batch: &mut HashSet<(String, String)>,
    ) -> Result<RowOutcome> {
        let identifier = &record.identifier;
        let identifier_key = (identifier.system.clone(), identifier.value.clone());

        let outcome = match operation {
            Operation::Create => {
                if created_in_batch.contains(&identifier_key) {
                    // Second occurrence inside one batch: a conflict even
                    // though the first row only just committed
                    return Ok(RowOutcome::failed(
                        dispatch,
                        duplicate_identifier_diagnostic(record),
                    ));
                }
                match self
                    .store
                    .insert_if_identifier_absent(record.clone(), &dispatch.supplier)
                    .await?
                {
                    InsertOutcome::Inserted(id) => {
                        created_in_batch.insert(identifier_key);
                        RowOutcome::delivered(dispatch, id)
                    }
                    InsertOutcome::IdentifierExists => {
                        RowOutcome::failed(dispatch, duplicate_identifier_diagnostic(record))
                    }
                }
            }
            Operation::Update => {
                match self
                    .store
                    .update(record.clone(), &dispatch.supplier)
                    .await?
                {
                    UpdateOutcome::Updated { id, .. } | UpdateOutcome::Unchanged { id, .. } => {
                        RowOutcome::delivered(dispatch, id)
                    }
                    UpdateOutcome::NotFound => {
                        RowOutcome::failed(dispatch, resource_not_found_diagnostic(record))
                    }
                }
            }
            Operation::Delete => match self.store.tombstone(identifier).await? {
                DeleteOutcome::Deleted(id) => RowOutcome::delivered(dispatch, id),
                DeleteOutcome::NotFound => {
                    RowOutcome::failed(dispatch, resource_not_found_diagnostic(record))
                }
            },
        };
        Ok(outcome)
    }
}

fn duplicate_identifier_diagnostic(record: &CanonicalRecord) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::DuplicateIdentifier,
        format!(
            "The provided identifier: {} is duplicated",
            record.identifier
        ),
    )
}

fn resource_not_found_diagnostic(record: &CanonicalRecord) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::ResourceNotFound,
        format!(
            "Immunisation resource with identifier {} was not found",
            record.identifier
        ),
    )
}
