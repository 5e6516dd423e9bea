//! Grant store error types.

use arbor_core::{CoreError, GrantId};
use thiserror::Error;

/// Errors raised by grant stores.
///
/// Querying an unknown principal is not an error; it yields no grants.
#[derive(Debug, Error)]
pub enum GrantError {
    /// No grant with this id exists.
    #[error("grant not found: {0}")]
    NotFound(GrantId),

    /// The grant has already been replaced.
    #[error("grant {grant} is already superseded by {by}")]
    AlreadySuperseded {
        /// The grant being superseded.
        grant: GrantId,
        /// Its existing replacement.
        by: GrantId,
    },

    /// A grant with this id already exists.
    #[error("duplicate grant id: {0}")]
    DuplicateGrant(GrantId),

    /// A replacement grant belongs to a different principal.
    #[error("replacement for grant {0} belongs to a different principal")]
    PrincipalMismatch(GrantId),

    /// A grants document could not be read.
    #[error("failed to read grants {path}: {source}")]
    ReadError {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A grants document is malformed.
    #[error("failed to parse grants {path}: {source}")]
    ParseError {
        /// File path, or `<inline>` for string input.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A grants document exceeds the size limit.
    #[error("grants {path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// File path.
        path: String,
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// A backing store failed.
    #[error("grant store unavailable: {0}")]
    Unavailable(String),

    /// A core value failed validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for grant store operations.
pub type GrantResult<T> = Result<T, GrantError>;
