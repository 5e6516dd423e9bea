//! Prelude module - commonly used test helpers.
//!
//! Use `use arbor_test::prelude::*;` in tests.

pub use crate::fixtures::{
    GrantBuilder, SAMPLE_CATALOG_TOML, cyclic_catalog, date, init_test_logging, perm,
    sample_catalog, scope,
};
pub use crate::mocks::{CountingGrantStore, FailingGrantStore};
