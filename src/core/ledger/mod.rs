//! Audit/queue ledger
//!
//! A table-backed state machine with one entry per admitted file, used for
//! duplicate detection and FIFO-per-queue chaining.

pub mod manager;
pub mod record;

pub use manager::AuditLedger;
pub use record::{AuditRecord, FileStatus};
