//! Forwarding and persistence
//!
//! Applies each dispatched row's operation to the record store with
//! identifier-uniqueness guarantees and produces the final per-row outcome.

pub mod forwarder;
pub mod rules;

pub use forwarder::RowForwarder;
pub use rules::validate_record;
