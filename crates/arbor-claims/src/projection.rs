//! Compact `name@scope` claim projection.
//!
//! An effective permission set projects to one string per permission, in set
//! order: `organization.view@root.acme`. Decoding is strict: one bad claim
//! or a repeated permission name rejects the whole list, so a damaged claim
//! set can never decode to a partial grant.

use std::collections::BTreeSet;

use arbor_core::{EffectivePermission, EffectivePermissionSet, PermissionName, ScopePath};

use crate::error::{ClaimError, ClaimResult};

/// Separator between permission name and scope.
pub const CLAIM_SEPARATOR: char = '@';

/// Project a set into `name@scope` strings, in permission-name order.
#[must_use]
pub fn encode_claims(set: &EffectivePermissionSet) -> Vec<String> {
    set.iter()
        .map(|entry| format!("{}{CLAIM_SEPARATOR}{}", entry.name, entry.scope))
        .collect()
}

/// Names of permissions in `set` that require an elevated session.
#[must_use]
pub fn elevated_claims(set: &EffectivePermissionSet) -> Vec<String> {
    set.iter()
        .filter(|entry| entry.requires_mfa)
        .map(|entry| entry.name.to_string())
        .collect()
}

/// Parse `name@scope` strings back into a set.
///
/// # Errors
///
/// Returns [`ClaimError::MalformedClaim`] if any claim lacks exactly one
/// separator or carries an invalid name or scope, and
/// [`ClaimError::DuplicatePermission`] if a name repeats.
pub fn decode_claims<S: AsRef<str>>(claims: &[S]) -> ClaimResult<EffectivePermissionSet> {
    let mut seen = BTreeSet::new();
    let mut entries = Vec::with_capacity(claims.len());

    for claim in claims {
        let entry = decode_claim(claim.as_ref())?;
        if !seen.insert(entry.name.clone()) {
            return Err(ClaimError::DuplicatePermission(entry.name.to_string()));
        }
        entries.push(entry);
    }

    Ok(EffectivePermissionSet::from_entries(entries))
}

/// Decode claims and flag the permissions listed in `elevated`.
///
/// # Errors
///
/// As [`decode_claims`]; additionally rejects an `elevated` name that is not
/// among the claims.
pub fn decode_claims_with_mfa<S: AsRef<str>, E: AsRef<str>>(
    claims: &[S],
    elevated: &[E],
) -> ClaimResult<EffectivePermissionSet> {
    let set = decode_claims(claims)?;
    let mut flagged = BTreeSet::new();
    for name in elevated {
        let name = name.as_ref();
        let parsed = PermissionName::new(name).map_err(|e| ClaimError::MalformedClaim {
            claim: name.to_owned(),
            reason: e.to_string(),
        })?;
        if set.get(&parsed).is_none() {
            return Err(ClaimError::MalformedClaim {
                claim: name.to_owned(),
                reason: "elevated permission is not claimed".to_owned(),
            });
        }
        flagged.insert(parsed);
    }

    Ok(set
        .iter()
        .cloned()
        .map(|entry| {
            let requires_mfa = flagged.contains(&entry.name);
            entry.with_mfa(requires_mfa)
        })
        .collect())
}

fn decode_claim(claim: &str) -> ClaimResult<EffectivePermission> {
    let malformed = |reason: String| ClaimError::MalformedClaim {
        claim: claim.to_owned(),
        reason,
    };

    let mut parts = claim.split(CLAIM_SEPARATOR);
    let (Some(name), Some(scope), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed(format!(
            "expected exactly one '{CLAIM_SEPARATOR}' separator"
        )));
    };

    let name = PermissionName::new(name).map_err(|e| malformed(e.to_string()))?;
    let scope = ScopePath::parse(scope).map_err(|e| malformed(e.to_string()))?;
    Ok(EffectivePermission::new(name, scope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::has_permission;

    fn set() -> EffectivePermissionSet {
        EffectivePermissionSet::from_entries([
            EffectivePermission::new(
                PermissionName::new("organization.view").unwrap(),
                ScopePath::parse("root.acme").unwrap(),
            ),
            EffectivePermission::new(
                PermissionName::new("billing.refund").unwrap(),
                ScopePath::parse("root").unwrap(),
            )
            .with_mfa(true),
        ])
    }

    #[test]
    fn test_encode_is_sorted() {
        assert_eq!(
            encode_claims(&set()),
            vec!["billing.refund@root", "organization.view@root.acme"]
        );
        assert_eq!(elevated_claims(&set()), vec!["billing.refund"]);
    }

    #[test]
    fn test_decoded_set_evaluates_identically() {
        let original = set();
        let decoded = decode_claims(&encode_claims(&original)).unwrap();

        for (permission, scope) in [
            ("organization.view", "root.acme"),
            ("organization.view", "root.acme.branch1"),
            ("organization.view", "root"),
            ("organization.view", "root.other"),
            ("billing.refund", "root.acme"),
            ("organization.update", "root.acme"),
        ] {
            assert_eq!(
                has_permission(Some(&decoded), permission, scope),
                has_permission(Some(&original), permission, scope),
                "{permission}@{scope}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in [
            "organization.view",
            "organization.view@",
            "@root",
            "organization.view@root@acme",
            "organization view@root",
            "organization.view@root..acme",
            "organization.view@ root.acme",
            "organization.view@root.acme ",
            " organization.view@root.acme",
            "",
        ] {
            assert!(
                matches!(decode_claims(&[bad]), Err(ClaimError::MalformedClaim { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_enforces_scope_limits() {
        use arbor_core::{MAX_LABEL_LEN, MAX_SCOPE_DEPTH, SCOPE_SEPARATOR};

        let at_limit = vec!["n"; MAX_SCOPE_DEPTH].join(&SCOPE_SEPARATOR.to_string());
        assert!(decode_claims(&[format!("organization.view@{at_limit}")]).is_ok());

        let too_deep = format!("{at_limit}{SCOPE_SEPARATOR}n");
        assert!(decode_claims(&[format!("organization.view@{too_deep}")]).is_err());

        let long_label = "x".repeat(MAX_LABEL_LEN.saturating_add(1));
        assert!(decode_claims(&[format!("organization.view@root.{long_label}")]).is_err());
    }

    #[test]
    fn test_one_bad_claim_fails_the_whole_decode() {
        let claims = ["organization.view@root.acme", "bogus"];
        assert!(decode_claims(&claims).is_err());
    }

    #[test]
    fn test_decode_rejects_duplicates() {
        let claims = ["organization.view@root.acme", "organization.view@root"];
        assert!(matches!(
            decode_claims(&claims),
            Err(ClaimError::DuplicatePermission(ref n)) if n == "organization.view"
        ));
    }

    #[test]
    fn test_decode_empty() {
        let empty: [&str; 0] = [];
        assert!(decode_claims(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_decode_with_mfa() {
        let original = set();
        let decoded =
            decode_claims_with_mfa(&encode_claims(&original), &elevated_claims(&original)).unwrap();
        assert_eq!(decoded, original);

        let unknown = decode_claims_with_mfa(&encode_claims(&original), &["member.invite"]);
        assert!(unknown.is_err());
    }
}
