//! Core error types.

use thiserror::Error;

/// Errors raised while constructing core values.
///
/// Resolution itself never fails on missing data; these errors only surface
/// when parsing scope paths, permission names or identifiers from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A scope path could not be parsed.
    #[error("invalid scope path '{path}': {reason}")]
    InvalidScope {
        /// The offending input.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A permission name could not be parsed.
    #[error("invalid permission name '{name}': {reason}")]
    InvalidPermissionName {
        /// The offending input.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An identifier was not a valid UUID.
    #[error("invalid {kind} id: {value}")]
    InvalidId {
        /// Which identifier type was being parsed.
        kind: &'static str,
        /// The offending input.
        value: String,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidScope {
            path: "root..acme".to_string(),
            reason: "empty label".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid scope path 'root..acme': empty label"
        );

        let err = CoreError::InvalidId {
            kind: "principal",
            value: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "invalid principal id: nope");
    }
}
