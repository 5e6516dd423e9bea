//! Catalog fingerprints.
//!
//! A fingerprint is a BLAKE3 digest over a canonical encoding of the catalog
//! contents. Claims carry it so that verifiers can reject tokens minted
//! against a different catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest identifying a catalog snapshot (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogFingerprint([u8; 32]);

impl CatalogFingerprint {
    /// Create from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for CatalogFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CatalogFingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for CatalogFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for CatalogFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CatalogFingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental canonical encoder.
///
/// Every field is length-prefixed so that adjacent fields cannot be confused
/// (`"ab" + "c"` hashes differently from `"a" + "bc"`).
pub(crate) struct FingerprintHasher {
    inner: blake3::Hasher,
}

impl FingerprintHasher {
    pub(crate) fn new(domain: &str) -> Self {
        let mut hasher = Self {
            inner: blake3::Hasher::new(),
        };
        hasher.field(domain.as_bytes());
        hasher
    }

    /// Feed one length-prefixed field.
    pub(crate) fn field(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update(&(bytes.len() as u64).to_le_bytes());
        self.inner.update(bytes);
        self
    }

    /// Feed a record tag separating sections.
    pub(crate) fn tag(&mut self, tag: u8) -> &mut Self {
        self.inner.update(&[tag]);
        self
    }

    pub(crate) fn finish(&self) -> CatalogFingerprint {
        CatalogFingerprint(*self.inner.finalize().as_bytes())
    }
}
