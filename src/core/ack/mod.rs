//! Acknowledgment accumulator
//!
//! Builds the per-file, per-row outcome report returned to the supplier.

pub mod accumulator;
pub mod line;

pub use accumulator::{business_ack_key, infrastructure_ack_key, AckAccumulator};
pub use line::{business_ack_row, infrastructure_ack_row, BUSINESS_ACK_HEADERS, INFRASTRUCTURE_ACK_HEADERS};
