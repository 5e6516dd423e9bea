//! Permission catalog reference data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::RoleId;

/// Maximum byte length of a permission name.
pub const MAX_PERMISSION_NAME_LEN: usize = 128;

/// Stable permission identifier such as `organization.update`.
///
/// Names are non-empty ASCII alphanumerics plus `.`, `_` and `-`. The `@`
/// character is reserved as the claim token separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Validate and wrap a permission name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPermissionName`] if the name is empty, too
    /// long, or contains characters outside the permission alphabet.
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        let reject = |reason: String| CoreError::InvalidPermissionName {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(reject("name is empty".to_owned()));
        }
        if name.len() > MAX_PERMISSION_NAME_LEN {
            return Err(reject(format!(
                "name exceeds {MAX_PERMISSION_NAME_LEN} bytes"
            )));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(reject(format!("invalid character '{bad}'")));
        }

        Ok(Self(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PermissionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PermissionName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(name: PermissionName) -> Self {
        name.0
    }
}

impl AsRef<str> for PermissionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A permission definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable name.
    pub name: PermissionName,
    /// Human-readable label.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether exercising this permission needs an elevated (MFA) session.
    #[serde(default)]
    pub requires_mfa: bool,
}

impl Permission {
    /// Create a permission with no metadata.
    #[must_use]
    pub fn new(name: PermissionName) -> Self {
        Self {
            name,
            display_name: None,
            description: None,
            requires_mfa: false,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the permission as requiring elevated authentication.
    #[must_use]
    pub fn requiring_mfa(mut self) -> Self {
        self.requires_mfa = true;
        self
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Role {
    /// Create a role.
    #[must_use]
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }
}

/// Assignment of a permission to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    /// The role.
    pub role: RoleId,
    /// The permission it grants.
    pub permission: PermissionName,
}

/// Directed edge "holding `from` implies holding `to`".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Implication {
    /// The implying permission.
    pub from: PermissionName,
    /// The implied permission.
    pub to: PermissionName,
}

impl Implication {
    /// Create an implication edge.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPermissionName`] when `from == to`.
    pub fn new(from: PermissionName, to: PermissionName) -> CoreResult<Self> {
        if from == to {
            return Err(CoreError::InvalidPermissionName {
                name: from.to_string(),
                reason: "a permission cannot imply itself".to_owned(),
            });
        }
        Ok(Self { from, to })
    }
}
