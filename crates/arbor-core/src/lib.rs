//! Arbor Core - Foundation types for the Arbor permission resolution engine.
//!
//! This crate provides:
//! - [`ScopePath`], the materialized-path address of an organizational node
//! - Identifier newtypes for principals, organizations, roles and grants
//! - Reference data types (permissions, roles, implications)
//! - [`RoleGrant`] and [`ResolutionContext`], the inputs to resolution
//! - [`EffectivePermissionSet`], the immutable output of resolution
//! - The fail-closed access decision functions in [`access`]
//!
//! # Example
//!
//! ```
//! use arbor_core::{EffectivePermission, EffectivePermissionSet, PermissionName, ScopePath};
//! use arbor_core::access::has_permission;
//!
//! let set = EffectivePermissionSet::from_entries([EffectivePermission::new(
//!     PermissionName::new("organization.view").unwrap(),
//!     ScopePath::parse("root.acme").unwrap(),
//! )]);
//!
//! assert!(has_permission(Some(&set), "organization.view", "root.acme.branch1"));
//! assert!(!has_permission(Some(&set), "organization.view", "root.other"));
//! assert!(!has_permission(None, "organization.view", "root.acme"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod access;
mod effective;
mod error;
mod grant;
mod permission;
mod scope;
mod types;

pub use access::{AccessDecision, AccessRequest, DenyReason, decide, has_permission};
pub use effective::{EffectivePermission, EffectivePermissionSet};
pub use error::{CoreError, CoreResult};
pub use grant::{ResolutionContext, RoleGrant};
pub use permission::{Implication, Permission, PermissionName, Role, RolePermission};
pub use scope::{MAX_LABEL_LEN, MAX_SCOPE_DEPTH, SCOPE_SEPARATOR, ScopePath};
pub use types::{GrantId, OrganizationId, PrincipalId, RoleId};
