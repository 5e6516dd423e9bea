//! Arbor Test - Shared test utilities for the Arbor workspace.
//!
//! This crate provides fixtures and mock stores that can be used across the
//! Arbor crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! arbor-test.workspace = true
//! ```
//!
//! ```rust
//! use arbor_core::PrincipalId;
//! use arbor_test::{GrantBuilder, date, sample_catalog};
//!
//! let catalog = sample_catalog();
//! let grant = GrantBuilder::new(PrincipalId::new(), "org-admin")
//!     .at("root.acme")
//!     .valid_until(date("2026-12-31"))
//!     .build();
//! assert!(catalog.role(&grant.role).is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![allow(clippy::missing_panics_doc)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
