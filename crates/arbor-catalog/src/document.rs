//! TOML catalog documents.
//!
//! ```toml
//! [[permissions]]
//! name = "organization.update"
//! display_name = "Update organization"
//!
//! [[roles]]
//! name = "org-admin"                 # id derived from the name when omitted
//! permissions = ["organization.update"]
//!
//! [[implications]]
//! from = "organization.update"
//! to = "organization.view"
//! ```

use std::path::Path;

use arbor_core::{Permission, PermissionName, RoleId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// Maximum accepted document size (1 MiB).
pub const MAX_DOCUMENT_SIZE: u64 = 1_048_576;

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    /// Permission definitions.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Role definitions with their permissions.
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
    /// Implication edges.
    #[serde(default)]
    pub implications: Vec<ImplicationEntry>,
}

/// A role and the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleEntry {
    /// Explicit id. Derived from `name` when omitted.
    #[serde(default)]
    pub id: Option<RoleId>,
    /// Role name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Granted permissions.
    #[serde(default)]
    pub permissions: Vec<PermissionName>,
}

impl RoleEntry {
    /// The role id, explicit or name-derived.
    #[must_use]
    pub fn resolved_id(&self) -> RoleId {
        self.id.unwrap_or_else(|| RoleId::from_name(&self.name))
    }
}

/// An implication edge as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplicationEntry {
    /// Implying permission.
    pub from: PermissionName,
    /// Implied permission.
    pub to: PermissionName,
}

impl CatalogDocument {
    /// Parse a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ParseError`] on malformed input.
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        parse(content, "<inline>")
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ReadError`] if the file cannot be read,
    /// [`CatalogError::TooLarge`] if it exceeds [`MAX_DOCUMENT_SIZE`], or
    /// [`CatalogError::ParseError`] on malformed input.
    pub fn load_file(path: &Path) -> CatalogResult<Self> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            path: shown.clone(),
            source: e,
        })?;

        let size = content.len() as u64;
        if size > MAX_DOCUMENT_SIZE {
            return Err(CatalogError::TooLarge {
                path: shown,
                size,
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        debug!(path = %shown, bytes = size, "read catalog document");
        parse(&content, &shown)
    }
}

fn parse(content: &str, path: &str) -> CatalogResult<CatalogDocument> {
    toml::from_str(content).map_err(|e| CatalogError::ParseError {
        path: path.to_owned(),
        source: e,
    })
}
