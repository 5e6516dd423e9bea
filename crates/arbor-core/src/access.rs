//! Access decisions against an effective permission set.
//!
//! Every function here fails closed: an absent set, a scope or permission
//! name that does not parse, or a permission the set does not hold all deny.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effective::EffectivePermissionSet;
use crate::permission::PermissionName;
use crate::scope::ScopePath;

/// Check whether `set` grants `permission` at `requested_scope`.
///
/// Returns `true` only when the set holds `permission` at a scope that is an
/// ancestor of, or equal to, the requested scope.
///
/// ```
/// use arbor_core::access::has_permission;
///
/// assert!(!has_permission(None, "organization.view", "root"));
/// ```
#[must_use]
pub fn has_permission(
    set: Option<&EffectivePermissionSet>,
    permission: &str,
    requested_scope: &str,
) -> bool {
    let Some(set) = set else {
        return false;
    };
    let Ok(name) = PermissionName::new(permission) else {
        return false;
    };
    let Ok(scope) = ScopePath::parse(requested_scope) else {
        return false;
    };
    set.allows(&name, &scope)
}

/// A fully parsed access request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Permission being exercised.
    pub permission: PermissionName,
    /// Node being acted on.
    pub scope: ScopePath,
    /// Whether the caller's session is elevated (MFA).
    #[serde(default)]
    pub elevated: bool,
}

impl AccessRequest {
    /// Create a non-elevated request.
    #[must_use]
    pub fn new(permission: PermissionName, scope: ScopePath) -> Self {
        Self {
            permission,
            scope,
            elevated: false,
        }
    }

    /// Mark the request as coming from an elevated session.
    #[must_use]
    pub fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access granted.
    Allow,
    /// Access denied.
    Deny {
        /// Why access was denied.
        reason: DenyReason,
    },
}

impl AccessDecision {
    /// Whether the decision allows access.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No permission set was available.
    NoPermissionSet,
    /// The permission is not held at all.
    NotGranted,
    /// The permission is held, but not at a scope covering the request.
    OutOfScope,
    /// The permission requires an elevated session.
    ElevationRequired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoPermissionSet => "no permission set",
            Self::NotGranted => "permission not granted",
            Self::OutOfScope => "permission not held at the requested scope",
            Self::ElevationRequired => "permission requires an elevated session",
        };
        f.write_str(s)
    }
}

/// Decide an [`AccessRequest`] against `set`.
#[must_use]
pub fn decide(set: Option<&EffectivePermissionSet>, request: &AccessRequest) -> AccessDecision {
    let deny = |reason| AccessDecision::Deny { reason };

    let Some(set) = set else {
        return deny(DenyReason::NoPermissionSet);
    };
    let Some(entry) = set.get(&request.permission) else {
        return deny(DenyReason::NotGranted);
    };
    if !entry.covers(&request.scope) {
        return deny(DenyReason::OutOfScope);
    }
    if entry.requires_mfa && !request.elevated {
        return deny(DenyReason::ElevationRequired);
    }
    AccessDecision::Allow
}
