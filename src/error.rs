//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror. Failures of a caller's
//! producing function are never represented here; they are handed back to
//! the caller unchanged.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A required constructor argument was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// The key holds a slot for a different value type
    #[error("Type mismatch for key {key}: cached slot does not hold {expected}")]
    TypeMismatch {
        /// The offending key
        key: String,
        /// Name of the requested value type
        expected: &'static str,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::MissingArgument("store");
        assert_eq!(err.to_string(), "Missing argument: store");

        let err = CacheError::TypeMismatch {
            key: "user:1".to_string(),
            expected: "u32",
        };
        assert!(err.to_string().contains("user:1"));
        assert!(err.to_string().contains("u32"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = CacheError::MissingArgument("store").into();
        assert!(err.downcast_ref::<CacheError>().is_some());
    }
}
