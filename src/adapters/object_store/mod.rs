//! Object storage adapters

pub mod fs;
pub mod memory;
pub mod traits;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
pub use traits::ObjectStore;
