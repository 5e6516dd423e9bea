//! Snapshot-isolated in-memory grant store.
//!
//! Readers load the current snapshot without locking. Writers serialize on a
//! mutex, copy the snapshot, apply their change and publish the copy, so a
//! reader only ever observes a complete before or after state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arbor_core::{GrantId, OrganizationId, PrincipalId, RoleGrant};
use arc_swap::ArcSwap;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::document::GrantsDocument;
use crate::error::{GrantError, GrantResult};
use crate::store::{GrantStore, is_visible};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    by_principal: HashMap<PrincipalId, Vec<RoleGrant>>,
    owners: HashMap<GrantId, PrincipalId>,
}

impl Snapshot {
    fn insert(&mut self, grant: RoleGrant) -> GrantResult<()> {
        if self.owners.contains_key(&grant.id) {
            return Err(GrantError::DuplicateGrant(grant.id));
        }
        self.owners.insert(grant.id, grant.principal);
        self.by_principal.entry(grant.principal).or_default().push(grant);
        Ok(())
    }

    fn get_mut(&mut self, id: GrantId) -> Option<&mut RoleGrant> {
        let principal = self.owners.get(&id)?;
        self.by_principal
            .get_mut(principal)?
            .iter_mut()
            .find(|g| g.id == id)
    }

    fn len(&self) -> usize {
        self.owners.len()
    }

    fn history(&self, principal: &PrincipalId) -> Vec<RoleGrant> {
        let mut grants = self
            .by_principal
            .get(principal)
            .cloned()
            .unwrap_or_default();
        grants.sort_by(|a, b| a.granted_at.cmp(&b.granted_at).then_with(|| a.id.cmp(&b.id)));
        grants
    }
}

/// In-memory [`GrantStore`] with lock-free reads.
#[derive(Debug, Default)]
pub struct MemoryGrantStore {
    snapshot: ArcSwap<Snapshot>,
    write_lock: Mutex<()>,
}

impl MemoryGrantStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `grants`.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::DuplicateGrant`] if two grants share an id.
    pub fn from_grants(grants: impl IntoIterator<Item = RoleGrant>) -> GrantResult<Self> {
        let mut snapshot = Snapshot::default();
        for grant in grants {
            snapshot.insert(grant)?;
        }
        Ok(Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    /// Create a store from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::DuplicateGrant`] if two entries share an id.
    pub fn from_document(document: GrantsDocument) -> GrantResult<Self> {
        Self::from_grants(document.grants.into_iter().map(|entry| entry.into_grant()))
    }

    /// Parse a TOML grants document.
    ///
    /// # Errors
    ///
    /// See [`GrantsDocument::from_toml_str`] and [`from_document`](Self::from_document).
    pub fn from_toml_str(content: &str) -> GrantResult<Self> {
        Self::from_document(GrantsDocument::from_toml_str(content)?)
    }

    /// Load a TOML grants document from disk.
    ///
    /// # Errors
    ///
    /// See [`GrantsDocument::load_file`] and [`from_document`](Self::from_document).
    pub fn load_file(path: &Path) -> GrantResult<Self> {
        let store = Self::from_document(GrantsDocument::load_file(path)?)?;
        info!(path = %path.display(), grants = store.len(), "loaded grants");
        Ok(store)
    }

    /// Record a new grant.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::DuplicateGrant`] if the id is already present.
    pub fn insert(&self, grant: RoleGrant) -> GrantResult<GrantId> {
        let id = grant.id;
        self.update(|snapshot| snapshot.insert(grant))?;
        debug!(grant = %id, "inserted grant");
        Ok(id)
    }

    /// Replace `previous` with `replacement`.
    ///
    /// The previous grant is kept for history with `superseded_by` set and is
    /// never active again.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::NotFound`] if `previous` does not exist,
    /// [`GrantError::AlreadySuperseded`] if it was already replaced,
    /// [`GrantError::PrincipalMismatch`] if the replacement belongs to another
    /// principal, or [`GrantError::DuplicateGrant`] if the replacement id is
    /// taken.
    pub fn supersede(&self, previous: GrantId, replacement: RoleGrant) -> GrantResult<GrantId> {
        let new_id = replacement.id;
        self.update(|snapshot| {
            let old = snapshot
                .get_mut(previous)
                .ok_or(GrantError::NotFound(previous))?;
            if let Some(by) = old.superseded_by {
                return Err(GrantError::AlreadySuperseded { grant: previous, by });
            }
            if old.principal != replacement.principal {
                return Err(GrantError::PrincipalMismatch(previous));
            }
            old.superseded_by = Some(new_id);
            snapshot.insert(replacement)
        })?;
        debug!(previous = %previous, replacement = %new_id, "superseded grant");
        Ok(new_id)
    }

    /// Look up a grant by id, including superseded ones.
    #[must_use]
    pub fn get(&self, id: GrantId) -> Option<RoleGrant> {
        let snapshot = self.snapshot.load();
        let principal = snapshot.owners.get(&id)?;
        snapshot
            .by_principal
            .get(principal)?
            .iter()
            .find(|g| g.id == id)
            .cloned()
    }

    /// Every grant ever recorded for `principal`, ordered by `granted_at`.
    #[must_use]
    pub fn history(&self, principal: PrincipalId) -> Vec<RoleGrant> {
        self.snapshot.load().history(&principal)
    }

    /// Number of grants, including superseded ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Whether the store holds no grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all grants as a document, ordered by principal then `granted_at`.
    ///
    /// The export is taken from a single snapshot.
    #[must_use]
    pub fn to_document(&self) -> GrantsDocument {
        let snapshot = self.snapshot.load();
        let mut principals: Vec<&PrincipalId> = snapshot.by_principal.keys().collect();
        principals.sort();
        GrantsDocument {
            grants: principals
                .into_iter()
                .flat_map(|p| snapshot.history(p))
                .map(Into::into)
                .collect(),
        }
    }

    /// Apply a fallible change to a private copy and publish it on success.
    fn update<F>(&self, change: F) -> GrantResult<()>
    where
        F: FnOnce(&mut Snapshot) -> GrantResult<()>,
    {
        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Snapshot::clone(&self.snapshot.load());
        change(&mut next)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }
}

impl GrantStore for MemoryGrantStore {
    fn active_grants(
        &self,
        principal: PrincipalId,
        as_of: NaiveDate,
        organization: Option<OrganizationId>,
    ) -> GrantResult<Vec<RoleGrant>> {
        let snapshot = self.snapshot.load();
        Ok(snapshot
            .by_principal
            .get(&principal)
            .map(|grants| {
                grants
                    .iter()
                    .filter(|g| is_visible(g, as_of, organization))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
