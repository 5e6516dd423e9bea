//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbor_grants::prelude::*;` to import all essential types.

pub use crate::{GrantError, GrantResult, GrantStore, MemoryGrantStore, StaticGrantStore};
