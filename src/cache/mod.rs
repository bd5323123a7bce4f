//! Cache Module
//!
//! Provides a generic concurrent in-memory cache with point-in-time
//! key/value snapshots.

mod stats;
mod store;
mod traits;


// Re-export public types
pub use stats::{CacheStats, StatsSnapshot};
pub use store::Cache;
pub use traits::Cacheable;
