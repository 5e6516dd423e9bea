//! Arbor Grants - Role grant storage.
//!
//! This crate provides:
//! - The [`GrantStore`] query trait consumed by the resolver
//! - [`MemoryGrantStore`], a snapshot-isolated in-memory implementation with
//!   insert, supersede and history operations
//! - [`StaticGrantStore`] for fixed grant lists
//! - TOML grant documents ([`GrantsDocument`])
//!
//! # Example
//!
//! ```
//! use arbor_core::{PrincipalId, RoleGrant, RoleId, ScopePath};
//! use arbor_grants::{GrantStore, MemoryGrantStore};
//! use chrono::NaiveDate;
//!
//! let alice = PrincipalId::new();
//! let store = MemoryGrantStore::new();
//! store
//!     .insert(RoleGrant::new(alice, RoleId::from_name("org-admin"), ScopePath::parse("root.acme").unwrap()))
//!     .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
//! assert_eq!(store.active_grants(alice, today, None).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod document;
mod error;
mod memory;
mod store;

pub use document::{GrantEntry, GrantsDocument, MAX_DOCUMENT_SIZE};
pub use error::{GrantError, GrantResult};
pub use memory::MemoryGrantStore;
pub use store::{GrantStore, StaticGrantStore, is_visible};
