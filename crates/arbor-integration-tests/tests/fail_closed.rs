//! Every failure path denies.

use std::sync::Arc;

use arbor_core::{
    AccessDecision, AccessRequest, DenyReason, EffectivePermissionSet, PrincipalId,
    ResolutionContext, decide, has_permission,
};
use arbor_resolver::{ResolveError, Resolver};
use arbor_test::{FailingGrantStore, date, init_test_logging, perm, sample_catalog, scope};

mod common;

use common::Harness;

/// What a caller does with a resolver result: a failed resolution leaves no set.
fn set_or_none(resolver: &Resolver, ctx: &ResolutionContext) -> Option<EffectivePermissionSet> {
    resolver.resolve_as_of(ctx, date("2026-06-15")).ok()
}

#[test]
fn test_store_failure_is_an_error_not_an_empty_grant() {
    init_test_logging();
    let resolver = Resolver::new(
        Arc::new(sample_catalog()),
        Arc::new(FailingGrantStore::new("connection reset")),
    );
    let ctx = ResolutionContext::platform(PrincipalId::new());

    let err = resolver
        .resolve_as_of(&ctx, date("2026-06-15"))
        .unwrap_err();
    assert!(matches!(err, ResolveError::GrantStore(_)));
    assert!(err.to_string().contains("connection reset"));

    let set = set_or_none(&resolver, &ctx);
    assert!(!has_permission(set.as_ref(), "organization.view", "root"));
    assert_eq!(
        decide(
            set.as_ref(),
            &AccessRequest::new(perm("organization.view"), scope("root"))
        ),
        AccessDecision::Deny {
            reason: DenyReason::NoPermissionSet
        }
    );
}

#[test]
fn test_malformed_requests_deny() {
    let harness = Harness::new();
    let alice = PrincipalId::new();
    harness
        .grants
        .insert(arbor_test::GrantBuilder::new(alice, "org-viewer").build())
        .unwrap();
    let set = harness.resolve(&ResolutionContext::platform(alice));
    assert!(has_permission(Some(&set), "organization.view", "root"));

    for (permission, requested) in [
        ("organization.view", ""),
        ("organization.view", "root..acme"),
        ("organization.view", "root.acme/east"),
        ("organization.view", "."),
        ("", "root"),
        ("organization view", "root"),
        ("organization.unknown", "root"),
    ] {
        assert!(
            !has_permission(Some(&set), permission, requested),
            "{permission:?} at {requested:?}"
        );
    }
}

#[test]
fn test_empty_and_absent_sets_deny() {
    let empty = EffectivePermissionSet::new();
    assert!(!has_permission(None, "organization.view", "root"));
    assert!(!has_permission(Some(&empty), "organization.view", "root"));
    assert_eq!(
        decide(
            Some(&empty),
            &AccessRequest::new(perm("organization.view"), scope("root"))
        ),
        AccessDecision::Deny {
            reason: DenyReason::NotGranted
        }
    );
}

#[test]
fn test_elevation_required_for_mfa_permission() {
    let harness = Harness::new();
    let alice = PrincipalId::new();
    harness
        .grants
        .insert(
            arbor_test::GrantBuilder::new(alice, "billing-admin")
                .at("root.acme")
                .build(),
        )
        .unwrap();
    let set = harness.resolve(&ResolutionContext::platform(alice));

    let refund = AccessRequest::new(perm("billing.refund"), scope("root.acme.finance"));
    assert_eq!(
        decide(Some(&set), &refund),
        AccessDecision::Deny {
            reason: DenyReason::ElevationRequired
        }
    );
    assert!(decide(Some(&set), &refund.clone().elevated(true)).is_allowed());

    // Elevation never widens scope.
    let elsewhere = AccessRequest::new(perm("billing.refund"), scope("root.other")).elevated(true);
    assert_eq!(
        decide(Some(&set), &elsewhere),
        AccessDecision::Deny {
            reason: DenyReason::OutOfScope
        }
    );

    // The implied read permission carries no elevation requirement.
    let read = AccessRequest::new(perm("billing.read"), scope("root.acme"));
    assert!(decide(Some(&set), &read).is_allowed());
}
