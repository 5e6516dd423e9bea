//! Effective permission sets - the immutable output of resolution.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::permission::PermissionName;
use crate::scope::ScopePath;

/// A permission held at an effective scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermission {
    /// Permission name.
    pub name: PermissionName,
    /// Widest scope the permission is held at.
    pub scope: ScopePath,
    /// Whether exercising the permission needs an elevated session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_mfa: bool,
}

impl EffectivePermission {
    /// Create an entry that does not require elevation.
    #[must_use]
    pub fn new(name: PermissionName, scope: ScopePath) -> Self {
        Self {
            name,
            scope,
            requires_mfa: false,
        }
    }

    /// Set the elevation flag.
    #[must_use]
    pub fn with_mfa(mut self, requires_mfa: bool) -> Self {
        self.requires_mfa = requires_mfa;
        self
    }

    /// Whether this entry covers `scope`.
    #[must_use]
    pub fn covers(&self, scope: &ScopePath) -> bool {
        self.scope.is_ancestor_or_equal(scope)
    }
}

/// Permissions keyed by name, at most one entry per name, iterated in name
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EffectivePermission>", into = "Vec<EffectivePermission>")]
pub struct EffectivePermissionSet {
    entries: BTreeMap<PermissionName, EffectivePermission>,
}

impl EffectivePermissionSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from entries.
    ///
    /// When a name appears more than once the widest scope wins, with the
    /// same tie-break the resolver uses.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = EffectivePermission>) -> Self {
        let mut map: BTreeMap<PermissionName, EffectivePermission> = BTreeMap::new();
        for entry in entries {
            match map.get(&entry.name) {
                Some(existing)
                    if ScopePath::widest_order(&existing.scope, &entry.scope)
                        != Ordering::Greater => {},
                _ => {
                    map.insert(entry.name.clone(), entry);
                },
            }
        }
        Self { entries: map }
    }

    /// Look up the entry for a permission.
    #[must_use]
    pub fn get(&self, name: &PermissionName) -> Option<&EffectivePermission> {
        self.entries.get(name)
    }

    /// Look up the entry for a permission by its textual name.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&EffectivePermission> {
        let name = PermissionName::new(name).ok()?;
        self.entries.get(&name)
    }

    /// Whether the set grants `name` at `scope`.
    #[must_use]
    pub fn allows(&self, name: &PermissionName, scope: &ScopePath) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.covers(scope))
    }

    /// Iterate entries in permission-name order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectivePermission> {
        self.entries.values()
    }

    /// Permission names in order.
    pub fn names(&self) -> impl Iterator<Item = &PermissionName> {
        self.entries.keys()
    }

    /// Number of permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<EffectivePermission>> for EffectivePermissionSet {
    fn from(entries: Vec<EffectivePermission>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<EffectivePermissionSet> for Vec<EffectivePermission> {
    fn from(set: EffectivePermissionSet) -> Self {
        set.entries.into_values().collect()
    }
}

impl FromIterator<EffectivePermission> for EffectivePermissionSet {
    fn from_iter<T: IntoIterator<Item = EffectivePermission>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

impl<'a> IntoIterator for &'a EffectivePermissionSet {
    type Item = &'a EffectivePermission;
    type IntoIter = std::collections::btree_map::Values<'a, PermissionName, EffectivePermission>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
