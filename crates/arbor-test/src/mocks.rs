//! Mock grant stores for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use arbor_core::{OrganizationId, PrincipalId, RoleGrant};
use arbor_grants::{GrantError, GrantResult, GrantStore};
use chrono::NaiveDate;

/// A grant store whose every query fails.
#[derive(Debug, Clone, Default)]
pub struct FailingGrantStore {
    message: String,
}

impl FailingGrantStore {
    /// Fail with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl GrantStore for FailingGrantStore {
    fn active_grants(
        &self,
        _principal: PrincipalId,
        _as_of: NaiveDate,
        _organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>> {
        Err(GrantError::Unavailable(self.message.clone()))
    }
}

/// Wraps another store and counts queries.
#[derive(Debug)]
pub struct CountingGrantStore<S> {
    inner: S,
    queries: AtomicUsize,
}

impl<S> CountingGrantStore<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: GrantStore> GrantStore for CountingGrantStore<S> {
    fn active_grants(
        &self,
        principal: PrincipalId,
        as_of: NaiveDate,
        organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.active_grants(principal, as_of, organization)
    }
}
