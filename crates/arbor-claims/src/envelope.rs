//! Signed claim tokens.
//!
//! A token is `base64url(json(claims)) "." base64url(signature)`, with the
//! Ed25519 signature taken over the encoded payload text. Tokens are a
//! snapshot: they are never updated when grants change and expire after the
//! issuer's lifetime.

use std::time::Duration;

use arbor_catalog::CatalogFingerprint;
use arbor_core::{
    EffectivePermissionSet, OrganizationId, PrincipalId, ResolutionContext, has_permission,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClaimError, ClaimResult};
use crate::keys::{ClaimSigningKey, ClaimVerifyingKey};
use crate::projection::{decode_claims_with_mfa, elevated_claims, encode_claims};

/// Separator between payload and signature.
const TOKEN_SEPARATOR: char = '.';

/// Largest accepted clock leeway.
pub const MAX_LEEWAY_SECS: u64 = 300;

/// Payload of a claim token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionClaims {
    /// Issuer.
    pub iss: String,
    /// Subject principal.
    pub sub: PrincipalId,
    /// Organization context, absent for platform-level tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<OrganizationId>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
    /// Id of the signing key.
    pub kid: String,
    /// Fingerprint of the catalog the permissions were resolved against.
    pub catalog: CatalogFingerprint,
    /// `name@scope` claims.
    pub perms: Vec<String>,
    /// Claimed permissions that require an elevated session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mfa: Vec<String>,
}

impl PermissionClaims {
    /// Decode the claimed permissions.
    ///
    /// # Errors
    ///
    /// Returns a [`ClaimError`] if any claim is malformed or repeated.
    pub fn effective_set(&self) -> ClaimResult<EffectivePermissionSet> {
        decode_claims_with_mfa(&self.perms, &self.mfa)
    }

    /// The resolution context the token speaks for.
    #[must_use]
    pub fn context(&self) -> ResolutionContext {
        ResolutionContext::new(self.sub, self.org)
    }
}

/// Mints signed claim tokens.
#[derive(Debug)]
pub struct ClaimIssuer {
    issuer: String,
    ttl: Duration,
    key: ClaimSigningKey,
    catalog: CatalogFingerprint,
}

impl ClaimIssuer {
    /// Issuer named `issuer`, minting tokens valid for `ttl`.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        ttl: Duration,
        key: ClaimSigningKey,
        catalog: CatalogFingerprint,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            ttl,
            key,
            catalog,
        }
    }

    /// Public half of the signing key.
    #[must_use]
    pub fn verifying_key(&self) -> ClaimVerifyingKey {
        self.key.verifying_key()
    }

    /// Issue a token for `set`, resolved for `ctx`, as of now.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::InvalidLifetime`] if the expiry overflows.
    pub fn issue(&self, ctx: &ResolutionContext, set: &EffectivePermissionSet) -> ClaimResult<String> {
        self.issue_at(ctx, set, Utc::now())
    }

    /// Issue a token as of `now`.
    ///
    /// # Errors
    ///
    /// As [`issue`](Self::issue).
    pub fn issue_at(
        &self,
        ctx: &ResolutionContext,
        set: &EffectivePermissionSet,
        now: DateTime<Utc>,
    ) -> ClaimResult<String> {
        let iat = now.timestamp();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| ClaimError::InvalidLifetime(format!("{:?}", self.ttl)))?;

        let claims = PermissionClaims {
            iss: self.issuer.clone(),
            sub: ctx.principal,
            org: ctx.organization,
            iat,
            exp,
            kid: self.key.key_id_hex(),
            catalog: self.catalog,
            perms: encode_claims(set),
            mfa: elevated_claims(set),
        };

        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = URL_SAFE_NO_PAD.encode(self.key.sign(payload.as_bytes()));

        debug!(
            principal = %ctx.principal,
            permissions = claims.perms.len(),
            exp,
            "Issued claim token"
        );
        Ok(format!("{payload}{TOKEN_SEPARATOR}{signature}"))
    }
}

/// Checks claim tokens offline.
#[derive(Debug, Clone)]
pub struct ClaimVerifier {
    issuer: String,
    key: ClaimVerifyingKey,
    leeway_secs: u64,
    catalog: Option<CatalogFingerprint>,
}

impl ClaimVerifier {
    /// Accept tokens from `issuer` signed by `key`, with no clock leeway and
    /// any catalog.
    #[must_use]
    pub fn new(issuer: impl Into<String>, key: ClaimVerifyingKey) -> Self {
        Self {
            issuer: issuer.into(),
            key,
            leeway_secs: 0,
            catalog: None,
        }
    }

    /// Tolerate this much clock skew, capped at [`MAX_LEEWAY_SECS`].
    #[must_use]
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs.min(MAX_LEEWAY_SECS);
        self
    }

    /// Only accept tokens minted against `catalog`.
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogFingerprint) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Verify `token` as of now.
    ///
    /// # Errors
    ///
    /// Returns a [`ClaimError`] describing the first failed check.
    pub fn verify(&self, token: &str) -> ClaimResult<PermissionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`.
    ///
    /// Checks, in order: token shape, signature, payload, key id, issuer,
    /// expiry, issue time and catalog.
    ///
    /// # Errors
    ///
    /// As [`verify`](Self::verify).
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> ClaimResult<PermissionClaims> {
        let (payload, signature) = token
            .split_once(TOKEN_SEPARATOR)
            .ok_or_else(|| ClaimError::MalformedToken("missing signature".to_owned()))?;
        if signature.contains(TOKEN_SEPARATOR) {
            return Err(ClaimError::MalformedToken(
                "too many segments".to_owned(),
            ));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| ClaimError::InvalidEncoding("base64url"))?;
        self.key.verify(payload.as_bytes(), &signature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| ClaimError::InvalidEncoding("base64url"))?;
        let claims: PermissionClaims = serde_json::from_slice(&payload)?;

        let kid = self.key.key_id_hex();
        if claims.kid != kid {
            return Err(ClaimError::KeyMismatch {
                expected: kid,
                actual: claims.kid,
            });
        }

        if claims.iss != self.issuer {
            return Err(ClaimError::IssuerMismatch {
                expected: self.issuer.clone(),
                actual: claims.iss,
            });
        }

        let leeway = i64::try_from(self.leeway_secs).unwrap_or(i64::MAX);
        let now = now.timestamp();
        if now.saturating_sub(leeway) >= claims.exp {
            return Err(ClaimError::Expired { exp: claims.exp });
        }
        if now.saturating_add(leeway) < claims.iat {
            return Err(ClaimError::NotYetValid { iat: claims.iat });
        }

        if let Some(expected) = self.catalog
            && claims.catalog != expected
        {
            return Err(ClaimError::CatalogMismatch {
                expected: expected.to_hex(),
                actual: claims.catalog.to_hex(),
            });
        }

        Ok(claims)
    }

    /// Verify `token` and decode its permissions.
    ///
    /// # Errors
    ///
    /// As [`verify`](Self::verify), plus any decode failure.
    pub fn effective_set(&self, token: &str) -> ClaimResult<EffectivePermissionSet> {
        self.verify(token)?.effective_set()
    }
}

/// Offline access check against a claim token.
///
/// A missing, invalid, expired or undecodable token denies.
#[must_use]
pub fn claims_allow(
    verifier: &ClaimVerifier,
    token: Option<&str>,
    permission: &str,
    scope: &str,
) -> bool {
    let Some(token) = token else {
        return false;
    };
    match verifier.effective_set(token) {
        Ok(set) => has_permission(Some(&set), permission, scope),
        Err(e) => {
            debug!(error = %e, "Rejected claim token");
            false
        },
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use arbor_core::{EffectivePermission, PermissionName, ScopePath};
    use chrono::TimeZone;

    const ISSUER: &str = "arbor-test";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn fingerprint(byte: u8) -> CatalogFingerprint {
        CatalogFingerprint::from_bytes([byte; 32])
    }

    fn set() -> EffectivePermissionSet {
        EffectivePermissionSet::from_entries([
            EffectivePermission::new(
                PermissionName::new("organization.view").unwrap(),
                ScopePath::parse("root.acme").unwrap(),
            ),
            EffectivePermission::new(
                PermissionName::new("billing.refund").unwrap(),
                ScopePath::parse("root.acme").unwrap(),
            )
            .with_mfa(true),
        ])
    }

    fn issuer() -> ClaimIssuer {
        ClaimIssuer::new(
            ISSUER,
            Duration::from_secs(600),
            ClaimSigningKey::generate(),
            fingerprint(1),
        )
    }

    fn verifier(issuer: &ClaimIssuer) -> ClaimVerifier {
        ClaimVerifier::new(ISSUER, issuer.verifying_key())
    }

    fn ctx() -> ResolutionContext {
        ResolutionContext::new(PrincipalId::new(), Some(OrganizationId::new()))
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let ctx = ctx();
        let token = issuer.issue_at(&ctx, &set(), now()).unwrap();

        let claims = verifier(&issuer).verify_at(&token, now()).unwrap();
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.context(), ctx);
        assert_eq!(claims.exp - claims.iat, 600);
        assert_eq!(claims.catalog, fingerprint(1));
        assert_eq!(claims.mfa, vec!["billing.refund"]);
        assert_eq!(claims.effective_set().unwrap(), set());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut other = set().iter().cloned().collect::<Vec<_>>();
        other.push(EffectivePermission::new(
            PermissionName::new("member.invite").unwrap(),
            ScopePath::root(),
        ));
        let forged = issuer
            .issue_at(&ctx(), &other.into_iter().collect(), now())
            .unwrap();
        let (forged_payload, _) = forged.split_once('.').unwrap();

        let spliced = format!("{forged_payload}.{signature}");
        assert!(matches!(
            verifier(&issuer).verify_at(&spliced, now()),
            Err(ClaimError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = issuer().issue_at(&ctx(), &set(), now()).unwrap();
        let stranger = ClaimVerifier::new(ISSUER, ClaimSigningKey::generate().verifying_key());
        assert!(matches!(
            stranger.verify_at(&token, now()),
            Err(ClaimError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_issuer_mismatch() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();
        let other = ClaimVerifier::new("someone-else", issuer.verifying_key());
        assert!(matches!(
            other.verify_at(&token, now()),
            Err(ClaimError::IssuerMismatch { .. })
        ));
    }

    #[test]
    fn test_expiry_and_leeway() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();
        let later = now() + chrono::Duration::seconds(630);

        assert!(matches!(
            verifier(&issuer).verify_at(&token, later),
            Err(ClaimError::Expired { .. })
        ));
        assert!(
            verifier(&issuer)
                .with_leeway(60)
                .verify_at(&token, later)
                .is_ok()
        );
    }

    #[test]
    fn test_leeway_is_capped() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();
        let much_later = now() + chrono::Duration::seconds(600 + 3_600);
        assert!(
            verifier(&issuer)
                .with_leeway(10_000)
                .verify_at(&token, much_later)
                .is_err()
        );
    }

    #[test]
    fn test_future_token_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();
        let earlier = now() - chrono::Duration::seconds(120);
        assert!(matches!(
            verifier(&issuer).verify_at(&token, earlier),
            Err(ClaimError::NotYetValid { .. })
        ));
    }

    #[test]
    fn test_catalog_mismatch() {
        let issuer = issuer();
        let token = issuer.issue_at(&ctx(), &set(), now()).unwrap();

        assert!(
            verifier(&issuer)
                .with_catalog(fingerprint(1))
                .verify_at(&token, now())
                .is_ok()
        );
        assert!(matches!(
            verifier(&issuer)
                .with_catalog(fingerprint(2))
                .verify_at(&token, now()),
            Err(ClaimError::CatalogMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let issuer = issuer();
        let verifier = verifier(&issuer);
        for bad in ["", "abc", "a.b.c", "!!!.???"] {
            assert!(verifier.verify_at(bad, now()).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_claims_allow_fails_closed() {
        let issuer = issuer();
        let verifier = verifier(&issuer);
        let token = issuer.issue(&ctx(), &set()).unwrap();

        assert!(claims_allow(&verifier, Some(&token), "organization.view", "root.acme.b1"));
        assert!(!claims_allow(&verifier, Some(&token), "organization.view", "root.other"));
        assert!(!claims_allow(&verifier, Some(&token), "organization.update", "root.acme"));
        assert!(!claims_allow(&verifier, None, "organization.view", "root.acme"));
        assert!(!claims_allow(&verifier, Some("garbage"), "organization.view", "root.acme"));
        assert!(!claims_allow(&verifier, Some(&token), "organization.view", "not a scope"));
    }

    #[test]
    fn test_empty_set_token() {
        let issuer = issuer();
        let token = issuer
            .issue_at(&ctx(), &EffectivePermissionSet::new(), now())
            .unwrap();
        let claims = verifier(&issuer).verify_at(&token, now()).unwrap();
        assert!(claims.perms.is_empty());
        assert!(claims.effective_set().unwrap().is_empty());
    }
}
