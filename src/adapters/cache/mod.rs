//! Permission cache adapters

pub mod bucket;
pub mod http;
pub mod memory;
pub mod traits;

pub use bucket::BucketPermissionCache;
pub use http::HttpPermissionCache;
pub use memory::MemoryPermissionCache;
pub use traits::{PermissionCache, PermissionsConfig};
