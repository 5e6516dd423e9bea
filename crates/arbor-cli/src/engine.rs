//! Wiring from configuration to engine components.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use arbor_catalog::Catalog;
use arbor_claims::{ClaimIssuer, ClaimSigningKey, ClaimVerifier, ClaimVerifyingKey};
use arbor_config::{Config, LoadedConfig};
use arbor_grants::MemoryGrantStore;
use arbor_resolver::Resolver;
use arbor_telemetry::LogConfig;

/// Loaded configuration plus the lazily built pieces commands need.
pub(crate) struct Engine {
    loaded: LoadedConfig,
}

impl Engine {
    /// Load configuration, layering `explicit` above the user file.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let loaded = Config::load(explicit).context("failed to load configuration")?;
        Ok(Self { loaded })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.loaded.config
    }

    /// Logging settings, with `verbose` forcing `debug`.
    pub(crate) fn log_config(&self, verbose: bool) -> Result<LogConfig> {
        let mut log = LogConfig::from_section(&self.config().logging)?;
        if verbose {
            "debug".clone_into(&mut log.level);
        }
        Ok(log)
    }

    pub(crate) fn catalog(&self) -> Result<Catalog> {
        let path = self
            .config()
            .catalog
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("no catalog configured; set [catalog] path or ARBOR_CATALOG"))?;
        Catalog::load_file(path).with_context(|| format!("loading catalog {}", path.display()))
    }

    pub(crate) fn grants(&self) -> Result<MemoryGrantStore> {
        let path = self
            .config()
            .grants
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("no grants configured; set [grants] path or ARBOR_GRANTS"))?;
        MemoryGrantStore::load_file(path)
            .with_context(|| format!("loading grants {}", path.display()))
    }

    pub(crate) fn resolver(&self) -> Result<Resolver> {
        Ok(Resolver::new(Arc::new(self.catalog()?), Arc::new(self.grants()?)))
    }

    fn signing_key(&self) -> Result<ClaimSigningKey> {
        let path = self
            .config()
            .claims
            .key_path_or_default(&self.loaded.home);
        ClaimSigningKey::load_or_generate(&path)
            .with_context(|| format!("loading signing key {}", path.display()))
    }

    pub(crate) fn issuer(&self, catalog: &Catalog) -> Result<ClaimIssuer> {
        let claims = &self.config().claims;
        Ok(ClaimIssuer::new(
            claims.issuer.clone(),
            Duration::from_secs(claims.ttl_secs),
            self.signing_key()?,
            catalog.fingerprint(),
        ))
    }

    /// Verifier for the configured issuer. Uses `public_key` if given,
    /// otherwise the public half of the local signing key.
    pub(crate) fn verifier(&self, public_key: Option<&str>) -> Result<ClaimVerifier> {
        let key = match public_key {
            Some(encoded) => ClaimVerifyingKey::from_base64(encoded)
                .context("invalid --public-key")?,
            None => self.signing_key()?.verifying_key(),
        };
        let claims = &self.config().claims;
        let mut verifier =
            ClaimVerifier::new(claims.issuer.clone(), key).with_leeway(claims.leeway_secs);
        if self.config().catalog.path.is_some() {
            verifier = verifier.with_catalog(self.catalog()?.fingerprint());
        }
        Ok(verifier)
    }
}
