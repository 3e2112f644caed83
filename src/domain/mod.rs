//! Domain models and types for the batch pipeline
//!
//! This module contains the core domain models shared by every pipeline
//! stage.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`MessageId`], [`RowId`], [`LocalId`],
//!   [`QueueName`], [`RecordId`])
//! - **File key grammar** ([`FileKey`]) and the ODS-code→supplier mapping
//! - **Vaccine types, operations and permissions** ([`VaccineType`],
//!   [`Operation`])
//! - **The canonical record model** ([`CanonicalRecord`])
//! - **Wire messages** ([`FileQueueMessage`], [`RowDispatch`], [`RowOutcome`])
//! - **Typed validation outcomes** ([`FileRejection`], [`Diagnostic`])
//! - **Error types** ([`BatchError`], [`CacheError`]) and the [`Result`] alias
//!
//! # Validation as values
//!
//! Validation failures are ordinary values rather than raised errors: file
//! level checks return `Result<T, FileRejection>` and row level checks attach
//! a [`Diagnostic`] to the row's outbound message. Only infrastructure
//! failures use [`BatchError`].

pub mod errors;
pub mod file_key;
pub mod ids;
pub mod record;
pub mod rejection;
pub mod result;
pub mod row;
pub mod vaccine;

pub use errors::{BatchError, CacheError};
pub use file_key::{supplier_for_ods_code, FileExtension, FileKey};
pub use ids::{LocalId, MessageId, QueueName, RecordId, RowId};
pub use record::{CanonicalRecord, CodedValue, PatientSubject, RecordIdentifier, VaccinationEvent};
pub use rejection::{Diagnostic, DiagnosticKind, FileRejection, FileRejectionKind};
pub use result::Result;
pub use row::{FileQueueMessage, RowDispatch, RowOutcome, RowPayload};
pub use vaccine::{
    has_any_vaccine_permission, permitted_operations, target_diseases, DiseaseCoding, Operation,
    VaccineType,
};
