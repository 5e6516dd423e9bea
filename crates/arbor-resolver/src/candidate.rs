//! Resolution candidates and their provenance.

use std::cmp::Ordering;
use std::fmt;

use arbor_core::{GrantId, PermissionName, RoleGrant, RoleId, ScopePath};
use serde::{Deserialize, Serialize};

/// Where an effective permission came from.
///
/// Explicit sources sort before implied ones, so at equal scope a directly
/// granted permission is reported as explicit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Granted directly by a role.
    Explicit {
        /// The grant that assigned the role.
        grant: GrantId,
        /// The role that carries the permission.
        role: RoleId,
    },
    /// Implied by another held permission.
    Implied {
        /// The implying permission.
        via: PermissionName,
    },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { grant, role } => write!(f, "granted by {role} ({grant})"),
            Self::Implied { via } => write!(f, "implied by {via}"),
        }
    }
}

/// A (scope, provenance) pair competing for one permission name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) scope: ScopePath,
    pub(crate) provenance: Provenance,
}

impl Candidate {
    pub(crate) fn explicit(grant: &RoleGrant) -> Self {
        Self {
            scope: grant.scope.clone(),
            provenance: Provenance::Explicit {
                grant: grant.id,
                role: grant.role,
            },
        }
    }

    pub(crate) fn implied(scope: ScopePath, via: PermissionName) -> Self {
        Self {
            scope,
            provenance: Provenance::Implied { via },
        }
    }

    /// Preference order: widest scope, then provenance. `Less` wins.
    pub(crate) fn preference(a: &Self, b: &Self) -> Ordering {
        ScopePath::widest_order(&a.scope, &b.scope).then_with(|| a.provenance.cmp(&b.provenance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::PrincipalId;

    fn explicit_at(path: &str) -> Candidate {
        Candidate::explicit(&RoleGrant::new(
            PrincipalId::new(),
            RoleId::from_name("org-viewer"),
            ScopePath::parse(path).unwrap(),
        ))
    }

    fn implied_at(path: &str) -> Candidate {
        Candidate::implied(
            ScopePath::parse(path).unwrap(),
            PermissionName::new("organization.update").unwrap(),
        )
    }

    #[test]
    fn test_wider_scope_wins_regardless_of_provenance() {
        assert_eq!(
            Candidate::preference(&implied_at("root"), &explicit_at("root.acme")),
            Ordering::Less
        );
    }

    #[test]
    fn test_explicit_wins_at_equal_scope() {
        assert_eq!(
            Candidate::preference(&explicit_at("root.acme"), &implied_at("root.acme")),
            Ordering::Less
        );
    }

    #[test]
    fn test_display() {
        let implied = implied_at("root");
        assert_eq!(
            implied.provenance.to_string(),
            "implied by organization.update"
        );

        let Provenance::Explicit { grant, role } = explicit_at("root").provenance else {
            panic!("expected explicit provenance");
        };
        let shown = Provenance::Explicit { grant, role }.to_string();
        assert!(shown.starts_with(&format!("granted by {role}")));
        assert!(shown.contains(&grant.to_string()));
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_value(&implied_at("root").provenance).unwrap();
        assert_eq!(json["kind"], "implied");
        assert_eq!(json["via"], "organization.update");
    }
}
