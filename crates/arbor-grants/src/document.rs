//! TOML grant documents.
//!
//! ```toml
//! [[grants]]
//! principal = "3b0f6a52-8c1e-4a57-9f0e-1b2c3d4e5f60"
//! role = "org-admin"                # role name or role UUID
//! organization = "..."              # optional
//! scope = "root.acme"
//! valid_from = "2026-01-01"         # optional, inclusive
//! valid_until = "2026-12-31"        # optional, inclusive
//! ```

use std::path::Path;

use arbor_core::{GrantId, OrganizationId, PrincipalId, RoleGrant, RoleId, ScopePath};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{GrantError, GrantResult};

/// Maximum accepted document size (1 MiB).
pub const MAX_DOCUMENT_SIZE: u64 = 1_048_576;

/// Serialized list of grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantsDocument {
    /// Grant entries.
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

/// One grant as written in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantEntry {
    /// Grant id. Generated when omitted.
    #[serde(default)]
    pub id: Option<GrantId>,
    /// Grantee.
    pub principal: PrincipalId,
    /// Role UUID, or a role name from which the id is derived.
    pub role: String,
    /// Owning organization.
    #[serde(default)]
    pub organization: Option<OrganizationId>,
    /// Scope path.
    pub scope: ScopePath,
    /// First day in force.
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    /// Last day in force.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Replacement grant.
    #[serde(default)]
    pub superseded_by: Option<GrantId>,
    /// When the grant was recorded. Defaults to load time.
    #[serde(default)]
    pub granted_at: Option<DateTime<Utc>>,
}

impl GrantEntry {
    /// Convert into a [`RoleGrant`].
    #[must_use]
    pub fn into_grant(self) -> RoleGrant {
        let role = Uuid::parse_str(&self.role)
            .map_or_else(|_| RoleId::from_name(&self.role), RoleId::from_uuid);
        RoleGrant {
            id: self.id.unwrap_or_default(),
            principal: self.principal,
            role,
            organization: self.organization,
            scope: self.scope,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            superseded_by: self.superseded_by,
            granted_at: self.granted_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<RoleGrant> for GrantEntry {
    fn from(grant: RoleGrant) -> Self {
        Self {
            id: Some(grant.id),
            principal: grant.principal,
            role: grant.role.as_uuid().to_string(),
            organization: grant.organization,
            scope: grant.scope,
            valid_from: grant.valid_from,
            valid_until: grant.valid_until,
            superseded_by: grant.superseded_by,
            granted_at: Some(grant.granted_at),
        }
    }
}

impl GrantsDocument {
    /// Parse a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::ParseError`] on malformed input.
    pub fn from_toml_str(content: &str) -> GrantResult<Self> {
        parse(content, "<inline>")
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::ReadError`], [`GrantError::TooLarge`] or
    /// [`GrantError::ParseError`].
    pub fn load_file(path: &Path) -> GrantResult<Self> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| GrantError::ReadError {
            path: shown.clone(),
            source: e,
        })?;

        let size = content.len() as u64;
        if size > MAX_DOCUMENT_SIZE {
            return Err(GrantError::TooLarge {
                path: shown,
                size,
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        debug!(path = %shown, bytes = size, "read grants document");
        parse(&content, &shown)
    }
}

fn parse(content: &str, path: &str) -> GrantResult<GrantsDocument> {
    toml::from_str(content).map_err(|e| GrantError::ParseError {
        path: path.to_owned(),
        source: e,
    })
}
