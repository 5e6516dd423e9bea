//! Ed25519 keys for signing claim tokens.

use std::fmt;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{ClaimError, ClaimResult};

/// Length of an Ed25519 secret or public key.
pub const KEY_LENGTH: usize = 32;

/// Length of the short key id, in bytes.
const KEY_ID_LENGTH: usize = 8;

fn key_id_of(public: &[u8; KEY_LENGTH]) -> String {
    hex::encode(public.get(..KEY_ID_LENGTH).unwrap_or_default())
}

/// Secret key used by a [`ClaimIssuer`](crate::ClaimIssuer).
///
/// The secret is zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct ClaimSigningKey {
    #[zeroize(skip)]
    verifying_key: VerifyingKey,
    signing_key: SigningKey,
}

impl ClaimSigningKey {
    /// Generate a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            verifying_key: signing_key.verifying_key(),
            signing_key,
        }
    }

    /// Rebuild from the 32 secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::InvalidKeyLength`] unless `bytes` is 32 bytes long.
    pub fn from_secret_bytes(bytes: &[u8]) -> ClaimResult<Self> {
        let mut secret: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| ClaimError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;

        let signing_key = SigningKey::from_bytes(&secret);
        secret.zeroize();

        Ok(Self {
            verifying_key: signing_key.verifying_key(),
            signing_key,
        })
    }

    /// Load the key at `path`, creating it if missing.
    ///
    /// New keys are written with mode 0600 through an exclusive create, so
    /// two processes racing on the same path end up sharing one key. A path
    /// that is a symlink is refused.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::IoError`] on filesystem failures or a symlinked
    /// path, and [`ClaimError::InvalidKeyLength`] for a truncated key file.
    pub fn load_or_generate(path: impl AsRef<Path>) -> ClaimResult<Self> {
        let path = path.as_ref();
        let io = |e: std::io::Error| ClaimError::IoError(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(path)
            {
                Ok(mut file) => {
                    let key = Self::generate();
                    let secret = Zeroizing::new(key.signing_key.to_bytes());
                    file.write_all(secret.as_slice()).map_err(io)?;
                    tracing::info!(path = %path.display(), key_id = %key.key_id_hex(), "Generated claim signing key");
                    return Ok(key);
                },
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {},
                Err(e) => return Err(io(e)),
            }
        }

        #[cfg(not(unix))]
        if !path.exists() {
            let key = Self::generate();
            let secret = Zeroizing::new(key.signing_key.to_bytes());
            let mut file = std::fs::File::create(path).map_err(io)?;
            file.write_all(secret.as_slice()).map_err(io)?;
            return Ok(key);
        }

        let meta = std::fs::symlink_metadata(path).map_err(io)?;
        if meta.file_type().is_symlink() {
            return Err(ClaimError::IoError(format!(
                "{}: refusing to read key file through a symlink",
                path.display()
            )));
        }

        let bytes = Zeroizing::new(std::fs::read(path).map_err(io)?);
        let key = Self::from_secret_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), key_id = %key.key_id_hex(), "Loaded claim signing key");
        Ok(key)
    }

    /// The matching public key.
    #[must_use]
    pub fn verifying_key(&self) -> ClaimVerifyingKey {
        ClaimVerifyingKey {
            key: self.verifying_key,
        }
    }

    /// Short hex id of the public key, safe to log.
    #[must_use]
    pub fn key_id_hex(&self) -> String {
        key_id_of(self.verifying_key.as_bytes())
    }

    /// Sign `message`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for ClaimSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSigningKey")
            .field("key_id", &self.key_id_hex())
            .finish_non_exhaustive()
    }
}

/// Public key used by a [`ClaimVerifier`](crate::ClaimVerifier).
///
/// Serializes as standard base64.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ClaimVerifyingKey {
    key: VerifyingKey,
}

impl ClaimVerifyingKey {
    /// Build from the 32 public bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::InvalidKeyLength`] for the wrong length and
    /// [`ClaimError::InvalidPublicKey`] if the bytes are not a curve point.
    pub fn from_bytes(bytes: &[u8]) -> ClaimResult<Self> {
        let bytes: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| ClaimError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| ClaimError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Parse standard base64.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::InvalidEncoding`] for bad base64, otherwise as
    /// [`from_bytes`](Self::from_bytes).
    pub fn from_base64(s: &str) -> ClaimResult<Self> {
        let bytes = STANDARD
            .decode(s.trim())
            .map_err(|_| ClaimError::InvalidEncoding("base64"))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.key.as_bytes())
    }

    /// Raw public bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        self.key.as_bytes()
    }

    /// Short hex id, safe to log.
    #[must_use]
    pub fn key_id_hex(&self) -> String {
        key_id_of(self.key.as_bytes())
    }

    /// Verify `signature` over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::SignatureInvalid`] on any mismatch.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> ClaimResult<()> {
        let signature =
            Signature::from_slice(signature).map_err(|_| ClaimError::SignatureInvalid)?;
        self.key
            .verify(message, &signature)
            .map_err(|_| ClaimError::SignatureInvalid)
    }
}

impl fmt::Debug for ClaimVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimVerifyingKey({})", self.key_id_hex())
    }
}

impl fmt::Display for ClaimVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for ClaimVerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for ClaimVerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}
