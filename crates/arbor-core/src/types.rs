//! Identifier newtypes.
//!
//! All identifiers are opaque UUIDs. They serialize as bare UUIDs and display
//! with a short kind prefix (`principal:1a2b3c4d`) for log output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing [`Uuid`].
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Return the inner [`Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let full = self.0.simple().to_string();
                write!(f, "{}:{}", $kind, &full[..8])
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            /// Accepts a bare UUID or one carrying this type's kind prefix.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(concat!($kind, ":"))
                    .unwrap_or(s)
                    .trim();
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| CoreError::InvalidId {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifies the subject whose permissions are being resolved.
    PrincipalId,
    "principal"
);

uuid_id!(
    /// Identifies a tenant organization.
    OrganizationId,
    "org"
);

uuid_id!(
    /// Identifies a role in the permission catalog.
    RoleId,
    "role"
);

/// Namespace for name-derived role identifiers.
const ROLE_NAMESPACE: Uuid = Uuid::from_u128(0x5f0e_9c1a_7b2d_4e38_a6c4_1d9b_3e7f_a012);

impl RoleId {
    /// Deterministic identifier derived from a role name (UUID v5).
    ///
    /// Catalog and grant documents may name roles instead of spelling out
    /// their UUIDs; both sides derive the same id.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&ROLE_NAMESPACE, name.as_bytes()))
    }
}

uuid_id!(
    /// Identifies a single role grant.
    GrantId,
    "grant"
);
