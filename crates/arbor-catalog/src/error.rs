//! Catalog error types.

use arbor_core::CoreError;
use thiserror::Error;

/// Errors raised while loading or building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document could not be read.
    #[error("failed to read catalog {path}: {source}")]
    ReadError {
        /// File path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The catalog document is not valid TOML or does not match the schema.
    #[error("failed to parse catalog {path}: {source}")]
    ParseError {
        /// File path, or `<inline>` for string input.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The catalog document exceeds the size limit.
    #[error("catalog {path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// File path.
        path: String,
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// A permission name is defined more than once.
    #[error("duplicate permission: {0}")]
    DuplicatePermission(String),

    /// A role id or role name is defined more than once.
    #[error("duplicate role: {0}")]
    DuplicateRole(String),

    /// A role or implication refers to a permission that is not defined.
    #[error("{context} refers to unknown permission '{name}'")]
    UnknownPermission {
        /// Where the reference appeared.
        context: String,
        /// The undefined permission.
        name: String,
    },

    /// An implication edge points a permission at itself.
    #[error("permission '{0}' cannot imply itself")]
    SelfImplication(String),

    /// A core value failed validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
