//! Configuration types.
//!
//! Every section implements [`Default`] with the values from the embedded
//! `defaults.toml`, so a bare `[section]` header yields a working setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log level, format, target and directives.
    pub logging: LoggingSection,
    /// Where the permission catalog lives.
    pub catalog: CatalogSection,
    /// Where the grant seed document lives.
    pub grants: GrantsSection,
    /// Claim token issuance and verification.
    pub claims: ClaimsSection,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"` or `"json"`.
    pub format: String,
    /// Per-crate directives (e.g. `["arbor_resolver=debug"]`).
    pub directives: Vec<String>,
    /// Output target: `"stderr"`, `"stdout"` or `"file"`.
    pub target: String,
    /// Directory for daily-rotated log files. Required when `target` is
    /// `"file"`.
    pub directory: Option<PathBuf>,
    /// Include timestamps.
    pub timestamps: bool,
    /// Use ANSI colors. Always off for file output.
    pub ansi: bool,
    /// Emit span open/close events.
    pub span_events: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            target: "stderr".to_owned(),
            directory: None,
            timestamps: true,
            ansi: true,
            span_events: false,
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogSection / GrantsSection
// ---------------------------------------------------------------------------

/// Permission catalog location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    /// Catalog TOML document.
    pub path: Option<PathBuf>,
}

/// Grant seed document location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrantsSection {
    /// Grants TOML document.
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// ClaimsSection
// ---------------------------------------------------------------------------

/// Claim token settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClaimsSection {
    /// `iss` written into and expected from tokens.
    pub issuer: String,
    /// Token lifetime in seconds.
    pub ttl_secs: u64,
    /// Clock skew tolerated by verifiers, in seconds.
    pub leeway_secs: u64,
    /// Signing key file. `None` uses `keys/claims.key` under the Arbor home.
    pub key_path: Option<PathBuf>,
}

impl Default for ClaimsSection {
    fn default() -> Self {
        Self {
            issuer: "arbor".to_owned(),
            ttl_secs: 900,
            leeway_secs: 30,
            key_path: None,
        }
    }
}

impl ClaimsSection {
    /// The signing key path, defaulting under `arbor_home`.
    #[must_use]
    pub fn key_path_or_default(&self, arbor_home: &Path) -> PathBuf {
        self.key_path
            .clone()
            .unwrap_or_else(|| arbor_home.join("keys").join("claims.key"))
    }
}
