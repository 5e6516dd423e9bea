//! Arbor Catalog - Permission reference data.
//!
//! This crate provides:
//! - [`Catalog`], an immutable snapshot of permissions, roles, role-permission
//!   mappings and the implication graph
//! - [`ImplicationGraph`], the directed "A implies B" graph
//! - TOML catalog documents ([`CatalogDocument`])
//! - Validation ([`ValidationIssue`]) and content fingerprints
//!   ([`CatalogFingerprint`])
//!
//! # Example
//!
//! ```
//! use arbor_catalog::Catalog;
//! use arbor_core::PermissionName;
//!
//! let catalog = Catalog::from_toml_str(r#"
//!     [[permissions]]
//!     name = "organization.update"
//!
//!     [[permissions]]
//!     name = "organization.view"
//!
//!     [[roles]]
//!     name = "org-admin"
//!     permissions = ["organization.update"]
//!
//!     [[implications]]
//!     from = "organization.update"
//!     to = "organization.view"
//! "#).unwrap();
//!
//! let update = PermissionName::new("organization.update").unwrap();
//! assert_eq!(catalog.graph().direct_implications(&update).len(), 1);
//! assert!(catalog.validate().is_empty());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod catalog;
mod document;
mod error;
mod fingerprint;
mod graph;

pub use catalog::{Catalog, CatalogBuilder, ValidationIssue};
pub use document::{CatalogDocument, ImplicationEntry, MAX_DOCUMENT_SIZE, RoleEntry};
pub use error::{CatalogError, CatalogResult};
pub use fingerprint::CatalogFingerprint;
pub use graph::ImplicationGraph;
