//! Row transform and dispatch
//!
//! Re-validates a queued file, converts each row to a canonical record or
//! diagnostic and emits one outbound message per row.

pub mod convert;
pub mod headers;
pub mod processor;
pub mod row;

pub use headers::{CsvBody, EXPECTED_CSV_HEADERS};
pub use processor::{FileProcessingSummary, RowProcessor, RowSink};
pub use row::{process_row, ProcessedRow};
