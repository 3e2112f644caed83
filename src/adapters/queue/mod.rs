//! File queue adapters

pub mod memory;
pub mod traits;

pub use memory::MemoryFileQueue;
pub use traits::FileQueue;
