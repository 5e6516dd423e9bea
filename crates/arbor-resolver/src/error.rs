//! Resolver error types.

use arbor_grants::GrantError;
use thiserror::Error;

/// Errors raised by [`Resolver`](crate::Resolver).
///
/// Missing data is never an error: unknown principals, roles and permissions
/// simply contribute nothing.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The grant store could not be queried.
    #[error("grant store query failed: {0}")]
    GrantStore(#[from] GrantError),
}

/// Result type for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
