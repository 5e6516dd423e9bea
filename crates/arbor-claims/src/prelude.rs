//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbor_claims::prelude::*;` to import all essential types.

pub use crate::{
    ClaimError, ClaimIssuer, ClaimResult, ClaimSigningKey, ClaimVerifier, ClaimVerifyingKey,
    PermissionClaims, claims_allow, decode_claims, encode_claims,
};
