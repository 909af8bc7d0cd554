//! Error types for cache configuration
//!
//! Cache operations themselves never fail; a miss is reported through `Option`.
//! The only fallible surface is turning environment variables into settings.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but is not an unsigned integer
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    /// Variable parsed but the value is not usable
    #[error("{var}={value} is out of range: {reason}")]
    OutOfRange {
        var: &'static str,
        value: u64,
        reason: &'static str,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_number_message() {
        let err = ConfigError::InvalidNumber {
            var: "CACHE_TTL_MS",
            value: "ten".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CACHE_TTL_MS must be an unsigned integer, got \"ten\""
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let err = ConfigError::OutOfRange {
            var: "WORKLOAD_THREADS",
            value: 0,
            reason: "at least one thread is required",
        };
        assert_eq!(
            err.to_string(),
            "WORKLOAD_THREADS=0 is out of range: at least one thread is required"
        );
    }
}
