//! TTL Cache - A concurrent in-process key-value cache
//!
//! Values are stored under string keys and, when a TTL is configured, become
//! invisible once their deadline has passed. Expiry is checked lazily on reads.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, TtlCache};
pub use config::{CacheConfig, WorkloadConfig};
pub use error::ConfigError;
