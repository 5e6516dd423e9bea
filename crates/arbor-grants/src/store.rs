//! The grant store interface.

use std::sync::Arc;

use arbor_core::{OrganizationId, PrincipalId, RoleGrant};
use chrono::NaiveDate;

use crate::error::GrantResult;

/// Read-only query over role grants.
///
/// Implementations return every grant for `principal` that is
/// - in force on `as_of` (inclusive window bounds, unbounded sides always
///   pass),
/// - owned by `organization` or platform-level (no organization), and
/// - not superseded.
///
/// Results carry no ordering guarantee. An unknown principal yields an empty
/// vector, never an error.
pub trait GrantStore: Send + Sync {
    /// Grants in force for `principal` on `as_of` in `organization`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backing store is unavailable.
    fn active_grants(
        &self,
        principal: PrincipalId,
        as_of: NaiveDate,
        organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>>;
}

impl<T: GrantStore + ?Sized> GrantStore for Arc<T> {
    fn active_grants(
        &self,
        principal: PrincipalId,
        as_of: NaiveDate,
        organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>> {
        (**self).active_grants(principal, as_of, organization)
    }
}

/// Whether `grant` passes the [`GrantStore`] filter.
#[must_use]
pub fn is_visible(grant: &RoleGrant, as_of: NaiveDate, organization: Option<OrganizationId>) -> bool {
    grant.is_active_on(as_of) && grant.applies_to(organization)
}

/// A store over a fixed slice of grants, filtered on every query.
///
/// Useful for one-off resolutions where grants were fetched elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticGrantStore {
    grants: Vec<RoleGrant>,
}

impl StaticGrantStore {
    /// Wrap a list of grants.
    #[must_use]
    pub fn new(grants: Vec<RoleGrant>) -> Self {
        Self { grants }
    }
}

impl GrantStore for StaticGrantStore {
    fn active_grants(
        &self,
        principal: PrincipalId,
        as_of: NaiveDate,
        organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>> {
        Ok(self
            .grants
            .iter()
            .filter(|g| g.principal == principal && is_visible(g, as_of, organization))
            .cloned()
            .collect())
    }
}
