//! Arbor Claims - Compact permission claims for issued credentials.
//!
//! This crate provides:
//! - [`encode_claims`] / [`decode_claims`], the `name@scope` projection of an
//!   effective permission set
//! - Ed25519 claim keys ([`ClaimSigningKey`], [`ClaimVerifyingKey`])
//! - A signed token envelope ([`ClaimIssuer`], [`ClaimVerifier`]) carrying
//!   issue/expiry times and the catalog fingerprint
//! - [`claims_allow`], the fail-closed offline access check
//!
//! Claims are a snapshot taken at issuance. They do not follow later grant
//! changes; the token lifetime bounds how stale they can become.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use arbor_catalog::CatalogFingerprint;
//! use arbor_claims::{ClaimIssuer, ClaimSigningKey, ClaimVerifier, claims_allow};
//! use arbor_core::{
//!     EffectivePermission, EffectivePermissionSet, PermissionName, PrincipalId,
//!     ResolutionContext, ScopePath,
//! };
//!
//! let set = EffectivePermissionSet::from_entries([EffectivePermission::new(
//!     PermissionName::new("organization.view").unwrap(),
//!     ScopePath::parse("root.acme").unwrap(),
//! )]);
//!
//! let issuer = ClaimIssuer::new(
//!     "arbor",
//!     Duration::from_secs(300),
//!     ClaimSigningKey::generate(),
//!     CatalogFingerprint::from_bytes([0; 32]),
//! );
//! let verifier = ClaimVerifier::new("arbor", issuer.verifying_key());
//!
//! let ctx = ResolutionContext::platform(PrincipalId::new());
//! let token = issuer.issue(&ctx, &set).unwrap();
//!
//! assert!(claims_allow(&verifier, Some(&token), "organization.view", "root.acme.east"));
//! assert!(!claims_allow(&verifier, Some(&token), "organization.view", "root"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod envelope;
mod error;
mod keys;
mod projection;

pub use envelope::{ClaimIssuer, ClaimVerifier, MAX_LEEWAY_SECS, PermissionClaims, claims_allow};
pub use error::{ClaimError, ClaimResult};
pub use keys::{ClaimSigningKey, ClaimVerifyingKey, KEY_LENGTH};
pub use projection::{
    CLAIM_SEPARATOR, decode_claims, decode_claims_with_mfa, elevated_claims, encode_claims,
};
