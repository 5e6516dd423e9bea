//! Claim error types.

use thiserror::Error;

/// Errors raised while encoding, signing or verifying claims.
///
/// Every variant is a denial on the access path; see
/// [`claims_allow`](crate::claims_allow).
#[derive(Debug, Error)]
pub enum ClaimError {
    /// A `name@scope` claim could not be parsed.
    #[error("malformed claim '{claim}': {reason}")]
    MalformedClaim {
        /// The offending claim.
        claim: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The same permission appears in more than one claim.
    #[error("duplicate claim for permission '{0}'")]
    DuplicatePermission(String),

    /// The token is not `payload.signature`.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Key material has the wrong length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// A public key is not a valid Ed25519 point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Base64 or hex decoding failed.
    #[error("invalid {0} encoding")]
    InvalidEncoding(&'static str),

    /// The signature does not verify.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The token was signed by a different key.
    #[error("token key id {actual} does not match verifier key id {expected}")]
    KeyMismatch {
        /// Verifier key id.
        expected: String,
        /// Token key id.
        actual: String,
    },

    /// The token was minted by a different issuer.
    #[error("token issuer '{actual}' does not match expected issuer '{expected}'")]
    IssuerMismatch {
        /// Expected issuer.
        expected: String,
        /// Token issuer.
        actual: String,
    },

    /// The token has expired.
    #[error("token expired at {exp}")]
    Expired {
        /// Expiry (unix seconds).
        exp: i64,
    },

    /// The token's issue time lies in the future.
    #[error("token issued in the future at {iat}")]
    NotYetValid {
        /// Issue time (unix seconds).
        iat: i64,
    },

    /// The token was minted against a different catalog.
    #[error("token catalog {actual} does not match {expected}")]
    CatalogMismatch {
        /// Verifier catalog fingerprint.
        expected: String,
        /// Token catalog fingerprint.
        actual: String,
    },

    /// The configured lifetime cannot be represented.
    #[error("invalid token lifetime: {0}")]
    InvalidLifetime(String),

    /// The claim payload could not be (de)serialized.
    #[error("claim payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Key file I/O failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for claim operations.
pub type ClaimResult<T> = Result<T, ClaimError>;
