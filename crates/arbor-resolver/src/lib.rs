//! Arbor Resolver - Effective permission resolution.
//!
//! Given a principal's active role grants, the resolver
//! 1. collects one candidate per (grant, permission granted by its role),
//! 2. keeps the widest scope per permission,
//! 3. expands implications, each implied permission inheriting the scope of
//!    the permission that implies it, and
//! 4. keeps the widest scope per permission again.
//!
//! "Widest" is [`ScopePath::widest_order`](arbor_core::ScopePath::widest_order):
//! fewest labels, then lexicographic label order. Results are deterministic
//! for identical inputs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use arbor_catalog::Catalog;
//! use arbor_core::{PrincipalId, ResolutionContext, RoleGrant, RoleId, ScopePath, has_permission};
//! use arbor_grants::MemoryGrantStore;
//! use arbor_resolver::Resolver;
//!
//! let catalog = Catalog::from_toml_str(r#"
//!     [[permissions]]
//!     name = "organization.update"
//!     [[permissions]]
//!     name = "organization.view"
//!     [[roles]]
//!     name = "org-admin"
//!     permissions = ["organization.update"]
//!     [[implications]]
//!     from = "organization.update"
//!     to = "organization.view"
//! "#).unwrap();
//!
//! let alice = PrincipalId::new();
//! let grants = MemoryGrantStore::new();
//! grants
//!     .insert(RoleGrant::new(alice, RoleId::from_name("org-admin"), ScopePath::parse("root.acme").unwrap()))
//!     .unwrap();
//!
//! let resolver = Resolver::new(Arc::new(catalog), Arc::new(grants));
//! let set = resolver.resolve(&ResolutionContext::platform(alice)).unwrap();
//!
//! assert!(has_permission(Some(&set), "organization.view", "root.acme.branch1"));
//! assert!(!has_permission(Some(&set), "organization.view", "root.other"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod candidate;
mod error;
mod expand;
mod reduce;
mod resolver;

pub use candidate::Provenance;
pub use error::{ResolveError, ResolveResult};
pub use resolver::{Resolution, Resolver, resolve_grants};
