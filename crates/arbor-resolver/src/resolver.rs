//! Effective permission resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arbor_catalog::Catalog;
use arbor_core::{
    EffectivePermission, EffectivePermissionSet, PermissionName, ResolutionContext, RoleGrant,
};
use arbor_grants::GrantStore;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::candidate::{Candidate, Provenance};
use crate::error::ResolveResult;
use crate::expand::expand;
use crate::reduce::widest_by_key;

/// Resolved permissions together with where each one came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The effective permission set.
    pub permissions: EffectivePermissionSet,
    /// Source of each permission in `permissions`.
    pub provenance: BTreeMap<PermissionName, Provenance>,
}

impl Resolution {
    /// Source of one permission.
    #[must_use]
    pub fn provenance_of(&self, name: &PermissionName) -> Option<&Provenance> {
        self.provenance.get(name)
    }

    /// The implication chain leading to `name`, ending at an explicit grant.
    ///
    /// Returns the permissions from `name` back towards its explicit source.
    /// Stops early if the chain loops (possible on cyclic catalogs).
    #[must_use]
    pub fn chain(&self, name: &PermissionName) -> Vec<PermissionName> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = name.clone();
        while seen.insert(current.clone()) {
            chain.push(current.clone());
            match self.provenance.get(&current) {
                Some(Provenance::Implied { via }) => current = via.clone(),
                Some(Provenance::Explicit { .. }) | None => break,
            }
        }
        chain
    }
}

/// Resolve a list of grants against a catalog.
///
/// Every grant passed in is treated as active; filtering by date,
/// organization and supersession is the grant store's job. Grants naming
/// roles or permissions the catalog does not know contribute nothing.
#[must_use]
pub fn resolve_grants(catalog: &Catalog, grants: &[RoleGrant]) -> Resolution {
    // 1. One candidate per (grant, granted permission).
    let mut explicit: Vec<(PermissionName, Candidate)> = Vec::new();
    for grant in grants {
        let Some(granted) = catalog.role_permissions(&grant.role) else {
            debug!(grant = %grant.id, role = %grant.role, "skipping grant for unknown role");
            continue;
        };
        for name in granted {
            if catalog.permission(name).is_none() {
                debug!(grant = %grant.id, permission = %name, "skipping unknown permission");
                continue;
            }
            explicit.push((name.clone(), Candidate::explicit(grant)));
        }
    }

    // 2. Widest explicit scope per permission.
    let frontier = widest_by_key(explicit, Candidate::preference);

    // 3. Implied candidates inherit their implier's scope.
    let implied = expand(catalog.graph(), &frontier);

    // 4. Widest scope per permission over explicit and implied candidates.
    let resolved = widest_by_key(frontier.into_iter().chain(implied), Candidate::preference);

    // 5. Freeze.
    let mut provenance = BTreeMap::new();
    let mut entries = Vec::with_capacity(resolved.len());
    for (name, candidate) in resolved {
        let requires_mfa = catalog.requires_mfa(&name);
        entries.push(EffectivePermission::new(name.clone(), candidate.scope).with_mfa(requires_mfa));
        provenance.insert(name, candidate.provenance);
    }

    Resolution {
        permissions: EffectivePermissionSet::from_entries(entries),
        provenance,
    }
}

/// Computes effective permission sets from a catalog and a grant store.
///
/// Holds only shared immutable handles; safe to share across threads and call
/// concurrently.
#[derive(Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    grants: Arc<dyn GrantStore>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("catalog", &self.catalog.fingerprint())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, grants: Arc<dyn GrantStore>) -> Self {
        Self { catalog, grants }
    }

    /// The catalog this resolver reads.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Resolve as of today (UTC).
    ///
    /// # Errors
    ///
    /// Returns an error if the grant store cannot be queried.
    pub fn resolve(&self, ctx: &ResolutionContext) -> ResolveResult<EffectivePermissionSet> {
        self.resolve_as_of(ctx, Utc::now().date_naive())
    }

    /// Resolve as of a given date.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant store cannot be queried.
    pub fn resolve_as_of(
        &self,
        ctx: &ResolutionContext,
        as_of: NaiveDate,
    ) -> ResolveResult<EffectivePermissionSet> {
        Ok(self.explain_as_of(ctx, as_of)?.permissions)
    }

    /// Resolve as of today (UTC), with provenance.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant store cannot be queried.
    pub fn explain(&self, ctx: &ResolutionContext) -> ResolveResult<Resolution> {
        self.explain_as_of(ctx, Utc::now().date_naive())
    }

    /// Resolve as of a given date, with provenance.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant store cannot be queried.
    pub fn explain_as_of(
        &self,
        ctx: &ResolutionContext,
        as_of: NaiveDate,
    ) -> ResolveResult<Resolution> {
        let grants = self
            .grants
            .active_grants(ctx.principal, as_of, ctx.organization)?;
        let resolution = resolve_grants(&self.catalog, &grants);
        debug!(
            principal = %ctx.principal,
            organization = ?ctx.organization.map(|o| o.to_string()),
            %as_of,
            grants = grants.len(),
            permissions = resolution.permissions.len(),
            "resolved effective permissions"
        );
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::{OrganizationId, PrincipalId, has_permission};
    use arbor_grants::MemoryGrantStore;
    use arbor_test::{FailingGrantStore, GrantBuilder, date, perm, sample_catalog};

    fn resolver(grants: Vec<RoleGrant>) -> Resolver {
        Resolver::new(
            Arc::new(sample_catalog()),
            Arc::new(MemoryGrantStore::from_grants(grants).unwrap()),
        )
    }

    fn scope_of(set: &EffectivePermissionSet, name: &str) -> Option<String> {
        set.get_str(name).map(|e| e.scope.to_string())
    }

    #[test]
    fn test_store_failure_is_an_error() {
        let resolver = Resolver::new(
            Arc::new(sample_catalog()),
            Arc::new(FailingGrantStore::new("offline")),
        );
        let err = resolver
            .resolve(&ResolutionContext::platform(PrincipalId::new()))
            .unwrap_err();
        assert!(matches!(err, crate::ResolveError::GrantStore(_)));
    }

    #[test]
    fn test_empty_grants_resolve_to_empty_set() {
        let resolution = resolve_grants(&sample_catalog(), &[]);
        assert!(resolution.permissions.is_empty());
        assert!(resolution.provenance.is_empty());
    }

    #[test]
    fn test_implied_permission_inherits_scope() {
        let alice = PrincipalId::new();
        let set = resolver(vec![GrantBuilder::new(alice, "org-admin").at("root.acme").build()])
            .resolve_as_of(&ResolutionContext::platform(alice), date("2026-06-01"))
            .unwrap();

        assert_eq!(scope_of(&set, "organization.update").as_deref(), Some("root.acme"));
        assert_eq!(scope_of(&set, "organization.view").as_deref(), Some("root.acme"));
        assert!(has_permission(Some(&set), "organization.view", "root.acme.branch1"));
        assert!(!has_permission(Some(&set), "organization.view", "root.other"));
    }

    #[test]
    fn test_explicit_wider_beats_implied_narrower() {
        let alice = PrincipalId::new();
        let set = resolver(vec![
            GrantBuilder::new(alice, "org-admin").at("root.acme").build(),
            GrantBuilder::new(alice, "org-viewer").at("root").build(),
        ])
        .resolve_as_of(&ResolutionContext::platform(alice), date("2026-06-01"))
        .unwrap();

        assert_eq!(scope_of(&set, "organization.view").as_deref(), Some("root"));
        assert_eq!(scope_of(&set, "organization.update").as_deref(), Some("root.acme"));
    }

    #[test]
    fn test_requires_mfa_is_carried() {
        let alice = PrincipalId::new();
        let set = resolver(vec![GrantBuilder::new(alice, "billing-admin").at("root").build()])
            .resolve_as_of(&ResolutionContext::platform(alice), date("2026-06-01"))
            .unwrap();

        assert!(set.get(&perm("billing.refund")).unwrap().requires_mfa);
        assert!(!set.get(&perm("billing.read")).unwrap().requires_mfa);
    }

    #[test]
    fn test_unknown_role_is_skipped() {
        let alice = PrincipalId::new();
        let set = resolver(vec![
            GrantBuilder::new(alice, "no-such-role").at("root").build(),
            GrantBuilder::new(alice, "org-viewer").at("root.acme").build(),
        ])
        .resolve_as_of(&ResolutionContext::platform(alice), date("2026-06-01"))
        .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(scope_of(&set, "organization.view").as_deref(), Some("root.acme"));
    }

    #[test]
    fn test_organization_context() {
        let alice = PrincipalId::new();
        let acme = OrganizationId::new();
        let resolver = resolver(vec![
            GrantBuilder::new(alice, "org-admin")
                .at("root.acme")
                .in_org(acme)
                .build(),
        ]);
        let today = date("2026-06-01");

        let in_acme = resolver
            .resolve_as_of(&ResolutionContext::new(alice, Some(acme)), today)
            .unwrap();
        assert!(!in_acme.is_empty());

        let elsewhere = resolver
            .resolve_as_of(&ResolutionContext::new(alice, Some(OrganizationId::new())), today)
            .unwrap();
        assert!(elsewhere.is_empty());

        let platform = resolver
            .resolve_as_of(&ResolutionContext::platform(alice), today)
            .unwrap();
        assert!(platform.is_empty());
    }

    #[test]
    fn test_provenance() {
        let alice = PrincipalId::new();
        let grant = GrantBuilder::new(alice, "org-admin").at("root.acme").build();
        let resolution = resolve_grants(&sample_catalog(), std::slice::from_ref(&grant));

        assert_eq!(
            resolution.provenance_of(&perm("organization.update")),
            Some(&Provenance::Explicit {
                grant: grant.id,
                role: grant.role
            })
        );
        assert_eq!(
            resolution.provenance_of(&perm("organization.view")),
            Some(&Provenance::Implied {
                via: perm("organization.update")
            })
        );
        assert_eq!(
            resolution.chain(&perm("organization.view")),
            vec![perm("organization.view"), perm("organization.update")]
        );
    }

    #[test]
    fn test_explicit_preferred_over_implied_at_equal_scope() {
        let alice = PrincipalId::new();
        let viewer = GrantBuilder::new(alice, "org-viewer").at("root.acme").build();
        let resolution = resolve_grants(
            &sample_catalog(),
            &[
                GrantBuilder::new(alice, "org-admin").at("root.acme").build(),
                viewer.clone(),
            ],
        );
        assert_eq!(
            resolution.provenance_of(&perm("organization.view")),
            Some(&Provenance::Explicit {
                grant: viewer.id,
                role: viewer.role
            })
        );
    }

    #[test]
    fn test_repeated_resolution_is_identical() {
        let alice = PrincipalId::new();
        let resolver = resolver(vec![
            GrantBuilder::new(alice, "org-admin").at("root.acme").build(),
            GrantBuilder::new(alice, "org-viewer").at("root.beta").build(),
            GrantBuilder::new(alice, "billing-admin").at("root.acme.branch1").build(),
        ]);
        let ctx = ResolutionContext::platform(alice);
        let first = resolver.explain_as_of(&ctx, date("2026-06-01")).unwrap();
        for _ in 0..10 {
            assert_eq!(resolver.explain_as_of(&ctx, date("2026-06-01")).unwrap(), first);
        }
    }

    #[test]
    fn test_resolution_serializes() {
        let alice = PrincipalId::new();
        let grant = GrantBuilder::new(alice, "org-viewer").at("root.acme").build();
        let resolution = resolve_grants(&sample_catalog(), &[grant]);
        let json = serde_json::to_value(&resolution).unwrap();

        assert_eq!(json["permissions"][0]["name"], "organization.view");
        assert_eq!(json["permissions"][0]["scope"], "root.acme");
        assert_eq!(json["provenance"]["organization.view"]["kind"], "explicit");
    }
}
