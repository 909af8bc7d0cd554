//! Configuration Module
//!
//! Cache settings and the workload driver settings, loadable from environment
//! variables.

use std::env;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable holding the cache TTL in milliseconds.
pub const TTL_VAR: &str = "CACHE_TTL_MS";

/// Cache construction settings.
///
/// `ttl: None` builds a cache whose entries never expire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied to every write, None = expiration disabled
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Creates a configuration with expiration disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables expiration with the given TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - TTL in milliseconds (unset or empty: no expiration)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl = parse_u64(TTL_VAR, lookup(TTL_VAR))?.map(Duration::from_millis);
        Ok(Self { ttl })
    }
}

/// Settings for the workload driver binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of keys written before the run
    pub num_keys: usize,
    /// Size of the key window the readers cycle over
    pub read_keys: usize,
    /// Number of reader threads
    pub threads: usize,
    /// Operations executed by each thread
    pub ops_per_thread: usize,
    /// Every n-th operation also deletes its key, 0 = never
    pub delete_every: usize,
    /// Cache settings used for the run
    pub cache: CacheConfig,
}

impl WorkloadConfig {
    /// Loads the workload settings from the process environment.
    ///
    /// # Environment Variables
    /// - `WORKLOAD_KEYS` - keys written up front (default: 30000)
    /// - `WORKLOAD_READ_KEYS` - key window read by the threads (default: 10000)
    /// - `WORKLOAD_THREADS` - reader threads (default: available parallelism)
    /// - `WORKLOAD_OPS` - operations per thread (default: 100000)
    /// - `WORKLOAD_DELETE_EVERY` - delete period (default: 10)
    /// - `CACHE_TTL_MS` - see [`CacheConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads the workload settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |var: &'static str, default: usize| -> Result<usize> {
            Ok(parse_u64(var, lookup(var))?.map_or(default, |v| v as usize))
        };

        let config = Self {
            num_keys: get("WORKLOAD_KEYS", defaults.num_keys)?,
            read_keys: get("WORKLOAD_READ_KEYS", defaults.read_keys)?,
            threads: get("WORKLOAD_THREADS", defaults.threads)?,
            ops_per_thread: get("WORKLOAD_OPS", defaults.ops_per_thread)?,
            delete_every: get("WORKLOAD_DELETE_EVERY", defaults.delete_every)?,
            cache: CacheConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Total operations executed by all threads, saturating on overflow.
    pub fn total_ops(&self) -> u64 {
        (self.threads as u64).saturating_mul(self.ops_per_thread as u64)
    }

    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::OutOfRange {
                var: "WORKLOAD_THREADS",
                value: 0,
                reason: "at least one thread is required",
            });
        }
        if self.read_keys == 0 {
            return Err(ConfigError::OutOfRange {
                var: "WORKLOAD_READ_KEYS",
                value: 0,
                reason: "the read window cannot be empty",
            });
        }
        if (self.threads as u64).checked_mul(self.ops_per_thread as u64).is_none() {
            return Err(ConfigError::OutOfRange {
                var: "WORKLOAD_OPS",
                value: self.ops_per_thread as u64,
                reason: "total operations across threads overflow a u64",
            });
        }
        if self.read_keys > self.num_keys {
            return Err(ConfigError::OutOfRange {
                var: "WORKLOAD_READ_KEYS",
                value: self.read_keys as u64,
                reason: "cannot exceed WORKLOAD_KEYS",
            });
        }
        Ok(())
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            num_keys: 30_000,
            read_keys: 10_000,
            threads: std::thread::available_parallelism().map_or(4, |n| n.get()),
            ops_per_thread: 100_000,
            delete_every: 10,
            cache: CacheConfig::default(),
        }
    }
}

/// Parses an optional variable; unset and blank both mean "not configured".
fn parse_u64(var: &'static str, raw: Option<String>) -> Result<Option<u64>> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}
