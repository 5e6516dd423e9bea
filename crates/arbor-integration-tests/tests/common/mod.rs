//! Shared harness for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use arbor_catalog::Catalog;
use arbor_core::{EffectivePermissionSet, ResolutionContext};
use arbor_grants::{GrantStore, MemoryGrantStore};
use arbor_resolver::Resolver;
use arbor_test::{date, init_test_logging, sample_catalog};

/// Resolution date used throughout the scenarios.
pub const AS_OF: &str = "2026-06-15";

/// Catalog, store and resolver wired together.
pub struct Harness {
    /// The sample catalog.
    pub catalog: Arc<Catalog>,
    /// The mutable grant store.
    pub grants: Arc<MemoryGrantStore>,
    /// Resolver over both.
    pub resolver: Resolver,
}

impl Harness {
    /// Sample catalog with an empty store.
    pub fn new() -> Self {
        Self::with_catalog(sample_catalog())
    }

    /// `catalog` with an empty store.
    pub fn with_catalog(catalog: Catalog) -> Self {
        init_test_logging();
        let catalog = Arc::new(catalog);
        let grants = Arc::new(MemoryGrantStore::new());
        let store: Arc<dyn GrantStore> = grants.clone();
        let resolver = Resolver::new(Arc::clone(&catalog), store);
        Self {
            catalog,
            grants,
            resolver,
        }
    }

    /// Resolve as of [`AS_OF`].
    pub fn resolve(&self, ctx: &ResolutionContext) -> EffectivePermissionSet {
        self.resolver
            .resolve_as_of(ctx, date(AS_OF))
            .expect("memory store never fails")
    }
}

/// `(name, scope)` pairs of a set, in set order.
pub fn pairs(set: &EffectivePermissionSet) -> Vec<(String, String)> {
    set.iter()
        .map(|e| (e.name.to_string(), e.scope.to_string()))
        .collect()
}
