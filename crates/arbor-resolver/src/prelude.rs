//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbor_resolver::prelude::*;` to import all essential types.

pub use crate::{Provenance, Resolution, ResolveError, ResolveResult, Resolver, resolve_grants};
