//! External service adapters
//!
//! Each adapter module defines a trait in `traits.rs` and one or more
//! implementations. Pipeline components depend only on the traits; the
//! [`factory`] builds concrete implementations from configuration.

pub mod cache;
pub mod factory;
pub mod ledger;
pub mod object_store;
pub mod queue;
pub mod store;

pub use factory::{create_object_store, create_permission_cache};
