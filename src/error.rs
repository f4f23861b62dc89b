//! Error types for the versioned map.

use crate::types::Version;
use thiserror::Error;

/// Main error type for map operations.
///
/// Every variant is a contract violation reported straight to the caller.
/// Nothing in the map retries or recovers internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Key already exists: {0}")]
    KeyAlreadyExists(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Version out of range: {requested} (current is {current})")]
    VersionOutOfRange { requested: Version, current: Version },
}

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_out_of_range_message() {
        let err = MapError::VersionOutOfRange {
            requested: Version(4),
            current: Version(3),
        };
        assert_eq!(err.to_string(), "Version out of range: 4 (current is 3)");
    }

    #[test]
    fn test_key_errors_carry_key() {
        let err = MapError::KeyAlreadyExists("\"a\"".to_string());
        assert_eq!(err.to_string(), "Key already exists: \"a\"");
    }
}
