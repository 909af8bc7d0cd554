//! Cache Module
//!
//! Provides a concurrent in-memory cache with optional lazy TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::MAX_TTL;
pub use stats::CacheStats;
pub use store::TtlCache;
