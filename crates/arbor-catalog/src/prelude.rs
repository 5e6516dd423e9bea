//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbor_catalog::prelude::*;` to import all essential types.

pub use crate::{
    Catalog, CatalogBuilder, CatalogError, CatalogFingerprint, CatalogResult, ImplicationGraph,
    ValidationIssue,
};
