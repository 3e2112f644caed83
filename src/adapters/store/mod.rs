//! Record store adapters

pub mod memory;
pub mod traits;

pub use memory::MemoryRecordStore;
pub use traits::{DeleteOutcome, InsertOutcome, RecordStore, StoredRecord, UpdateOutcome};
