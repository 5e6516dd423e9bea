//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbor_core::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use arbor_core::prelude::*;
//!
//! let scope = ScopePath::parse("root.acme").unwrap();
//! assert_eq!(scope.depth(), 2);
//! ```

// Errors
pub use crate::{CoreError, CoreResult};

// Scope hierarchy
pub use crate::ScopePath;

// Identifiers
pub use crate::{GrantId, OrganizationId, PrincipalId, RoleId};

// Reference data
pub use crate::{Implication, Permission, PermissionName, Role, RolePermission};

// Resolution inputs and outputs
pub use crate::{EffectivePermission, EffectivePermissionSet, ResolutionContext, RoleGrant};

// Access decisions
pub use crate::{AccessDecision, AccessRequest, DenyReason, decide, has_permission};
