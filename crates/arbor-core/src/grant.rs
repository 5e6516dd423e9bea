//! Role grants and the resolution context.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scope::ScopePath;
use crate::types::{GrantId, OrganizationId, PrincipalId, RoleId};

/// A role assigned to a principal at a scope, optionally time-bounded.
///
/// Validity bounds are inclusive calendar dates. A grant with no organization
/// is platform-level and applies in every organization context. Grants with
/// `superseded_by` set are kept for history and are never active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Grant identifier.
    pub id: GrantId,
    /// Grantee.
    pub principal: PrincipalId,
    /// Granted role.
    pub role: RoleId,
    /// Owning organization, `None` for platform-level grants.
    #[serde(default)]
    pub organization: Option<OrganizationId>,
    /// Node the role is granted at.
    pub scope: ScopePath,
    /// First day the grant is in force.
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    /// Last day the grant is in force.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Replacement grant, if this one was superseded.
    #[serde(default)]
    pub superseded_by: Option<GrantId>,
    /// When the grant was recorded.
    pub granted_at: DateTime<Utc>,
}

impl RoleGrant {
    /// Create an unbounded, platform-level grant.
    #[must_use]
    pub fn new(principal: PrincipalId, role: RoleId, scope: ScopePath) -> Self {
        Self {
            id: GrantId::new(),
            principal,
            role,
            organization: None,
            scope,
            valid_from: None,
            valid_until: None,
            superseded_by: None,
            granted_at: Utc::now(),
        }
    }

    /// Restrict the grant to an organization.
    #[must_use]
    pub fn in_organization(mut self, organization: OrganizationId) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Set the inclusive validity window.
    #[must_use]
    pub fn valid_between(mut self, from: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        self.valid_from = from;
        self.valid_until = until;
        self
    }

    /// Whether the validity window contains `as_of`.
    ///
    /// Ignores supersession; see [`is_active_on`](Self::is_active_on).
    #[must_use]
    pub fn is_within_window(&self, as_of: NaiveDate) -> bool {
        self.valid_from.is_none_or(|from| from <= as_of)
            && self.valid_until.is_none_or(|until| until >= as_of)
    }

    /// Whether the grant is in force on `as_of`.
    #[must_use]
    pub fn is_active_on(&self, as_of: NaiveDate) -> bool {
        self.superseded_by.is_none() && self.is_within_window(as_of)
    }

    /// Whether the grant applies in the given organization context.
    ///
    /// Platform-level grants always apply. An org-agnostic context sees only
    /// platform-level grants.
    #[must_use]
    pub fn applies_to(&self, organization: Option<OrganizationId>) -> bool {
        match self.organization {
            None => true,
            Some(own) => organization == Some(own),
        }
    }
}

/// Who is being resolved, and in which organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// The principal.
    pub principal: PrincipalId,
    /// Organization context, `None` for platform-level resolution.
    pub organization: Option<OrganizationId>,
}

impl ResolutionContext {
    /// Context for a principal within an organization.
    #[must_use]
    pub fn new(principal: PrincipalId, organization: Option<OrganizationId>) -> Self {
        Self {
            principal,
            organization,
        }
    }

    /// Platform-level context.
    #[must_use]
    pub fn platform(principal: PrincipalId) -> Self {
        Self::new(principal, None)
    }
}
