//! The immutable catalog snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use arbor_core::{Implication, Permission, PermissionName, Role, RoleId};
use tracing::{info, warn};

use crate::document::{CatalogDocument, ImplicationEntry, RoleEntry};
use crate::error::{CatalogError, CatalogResult};
use crate::fingerprint::{CatalogFingerprint, FingerprintHasher};
use crate::graph::ImplicationGraph;

const FINGERPRINT_DOMAIN: &str = "arbor.catalog.v1";

/// Permissions, roles, role-permission mappings and the implication graph.
///
/// Built once, then shared read-only (typically behind an `Arc`) between the
/// resolver, the claim issuer and verifiers.
#[derive(Debug, Clone)]
pub struct Catalog {
    permissions: BTreeMap<PermissionName, Permission>,
    roles: BTreeMap<RoleId, Role>,
    role_permissions: BTreeMap<RoleId, BTreeSet<PermissionName>>,
    graph: ImplicationGraph,
    fingerprint: CatalogFingerprint,
}

/// Finding reported by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Permissions that imply each other. Resolution still terminates.
    Cycle(Vec<PermissionName>),
    /// Defined but neither granted by a role nor implied by anything.
    Unreachable(PermissionName),
}

impl ValidationIssue {
    /// Whether the issue is a configuration error rather than informational.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Cycle(_))
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle(members) => {
                let names: Vec<&str> = members.iter().map(PermissionName::as_str).collect();
                write!(f, "implication cycle: {}", names.join(" -> "))
            },
            Self::Unreachable(name) => {
                write!(f, "permission '{name}' is not granted by any role or implied")
            },
        }
    }
}

impl Catalog {
    /// Start building a catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::assemble(
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            ImplicationGraph::new(),
        )
    }

    /// Build a catalog from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate definitions, references to
    /// undefined permissions, or self-implications.
    pub fn from_document(document: CatalogDocument) -> CatalogResult<Self> {
        let mut builder = Self::builder();
        for permission in document.permissions {
            builder = builder.permission(permission);
        }
        for RoleEntry {
            id,
            name,
            description,
            permissions,
        } in document.roles
        {
            let id = id.unwrap_or_else(|| RoleId::from_name(&name));
            let mut role = Role::new(id, name);
            role.description = description;
            builder = builder.role(role, permissions);
        }
        for ImplicationEntry { from, to } in document.implications {
            builder = builder.implication(from, to);
        }
        builder.build()
    }

    /// Parse and build a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// See [`CatalogDocument::from_toml_str`] and [`from_document`](Self::from_document).
    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        Self::from_document(CatalogDocument::from_toml_str(content)?)
    }

    /// Load a catalog from a TOML file.
    ///
    /// Cycles do not fail the load; they are logged and reported by
    /// [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// See [`CatalogDocument::load_file`] and [`from_document`](Self::from_document).
    pub fn load_file(path: &Path) -> CatalogResult<Self> {
        let catalog = Self::from_document(CatalogDocument::load_file(path)?)?;
        info!(
            path = %path.display(),
            permissions = catalog.permissions.len(),
            roles = catalog.roles.len(),
            implications = catalog.graph.edge_count(),
            fingerprint = %catalog.fingerprint,
            "loaded permission catalog"
        );
        Ok(catalog)
    }

    /// Look up a permission definition.
    #[must_use]
    pub fn permission(&self, name: &PermissionName) -> Option<&Permission> {
        self.permissions.get(name)
    }

    /// All permission definitions in name order.
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    /// Whether `name` is flagged as requiring an elevated session.
    #[must_use]
    pub fn requires_mfa(&self, name: &PermissionName) -> bool {
        self.permissions.get(name).is_some_and(|p| p.requires_mfa)
    }

    /// Look up a role.
    #[must_use]
    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.get(id)
    }

    /// Look up a role by name.
    #[must_use]
    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|role| role.name == name)
    }

    /// All roles in id order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Permissions granted by a role, or `None` if the role is unknown.
    #[must_use]
    pub fn role_permissions(&self, id: &RoleId) -> Option<&BTreeSet<PermissionName>> {
        self.role_permissions.get(id)
    }

    /// The implication graph.
    #[must_use]
    pub fn graph(&self) -> &ImplicationGraph {
        &self.graph
    }

    /// Digest of the catalog contents, independent of definition order.
    #[must_use]
    pub fn fingerprint(&self) -> CatalogFingerprint {
        self.fingerprint
    }

    /// Report cycles and unreachable permissions.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = self
            .graph
            .cycles()
            .into_iter()
            .map(ValidationIssue::Cycle)
            .collect();

        let granted: BTreeSet<&PermissionName> =
            self.role_permissions.values().flatten().collect();
        issues.extend(
            self.permissions
                .keys()
                .filter(|name| !granted.contains(name) && !self.graph.is_implied(name))
                .cloned()
                .map(ValidationIssue::Unreachable),
        );
        issues
    }

    /// Convert back into a document.
    #[must_use]
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            permissions: self.permissions.values().cloned().collect(),
            roles: self
                .roles
                .values()
                .map(|role| RoleEntry {
                    id: Some(role.id),
                    name: role.name.clone(),
                    description: role.description.clone(),
                    permissions: self
                        .role_permissions
                        .get(&role.id)
                        .map(|perms| perms.iter().cloned().collect())
                        .unwrap_or_default(),
                })
                .collect(),
            implications: self
                .graph
                .edges()
                .map(|(from, to)| ImplicationEntry {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect(),
        }
    }

    fn assemble(
        permissions: BTreeMap<PermissionName, Permission>,
        roles: BTreeMap<RoleId, Role>,
        role_permissions: BTreeMap<RoleId, BTreeSet<PermissionName>>,
        graph: ImplicationGraph,
    ) -> Self {
        let fingerprint = compute_fingerprint(&permissions, &roles, &role_permissions, &graph);
        Self {
            permissions,
            roles,
            role_permissions,
            graph,
            fingerprint,
        }
    }
}

/// Hash the catalog in its canonical (sorted map) order.
fn compute_fingerprint(
    permissions: &BTreeMap<PermissionName, Permission>,
    roles: &BTreeMap<RoleId, Role>,
    role_permissions: &BTreeMap<RoleId, BTreeSet<PermissionName>>,
    graph: &ImplicationGraph,
) -> CatalogFingerprint {
    let mut hasher = FingerprintHasher::new(FINGERPRINT_DOMAIN);

    for permission in permissions.values() {
        hasher
            .tag(b'p')
            .field(permission.name.as_str().as_bytes())
            .field(&[u8::from(permission.requires_mfa)]);
    }
    for role in roles.values() {
        hasher
            .tag(b'r')
            .field(role.id.as_uuid().as_bytes())
            .field(role.name.as_bytes());
        for name in role_permissions.get(&role.id).into_iter().flatten() {
            hasher.tag(b'g').field(name.as_str().as_bytes());
        }
    }
    for (from, to) in graph.edges() {
        hasher
            .tag(b'i')
            .field(from.as_str().as_bytes())
            .field(to.as_str().as_bytes());
    }

    hasher.finish()
}

/// Accumulates definitions and checks them on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    permissions: Vec<Permission>,
    roles: Vec<(Role, Vec<PermissionName>)>,
    implications: Vec<(PermissionName, PermissionName)>,
}

impl CatalogBuilder {
    /// Define a permission.
    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Define a role and the permissions it grants.
    #[must_use]
    pub fn role(mut self, role: Role, permissions: impl IntoIterator<Item = PermissionName>) -> Self {
        self.roles.push((role, permissions.into_iter().collect()));
        self
    }

    /// Add an implication edge.
    #[must_use]
    pub fn implication(mut self, from: PermissionName, to: PermissionName) -> Self {
        self.implications.push((from, to));
        self
    }

    /// Validate and freeze the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicatePermission`],
    /// [`CatalogError::DuplicateRole`], [`CatalogError::UnknownPermission`]
    /// or [`CatalogError::SelfImplication`].
    pub fn build(self) -> CatalogResult<Catalog> {
        let mut permissions = BTreeMap::new();
        for permission in self.permissions {
            let name = permission.name.clone();
            if permissions.insert(name.clone(), permission).is_some() {
                return Err(CatalogError::DuplicatePermission(name.to_string()));
            }
        }

        let require_known = |context: &dyn Fn() -> String, name: &PermissionName| {
            if permissions.contains_key(name) {
                Ok(())
            } else {
                Err(CatalogError::UnknownPermission {
                    context: context(),
                    name: name.to_string(),
                })
            }
        };

        let mut roles = BTreeMap::new();
        let mut role_names = BTreeSet::new();
        let mut role_permissions = BTreeMap::new();
        for (role, granted) in self.roles {
            for name in &granted {
                require_known(&|| format!("role '{}'", role.name), name)?;
            }
            if !role_names.insert(role.name.clone()) {
                return Err(CatalogError::DuplicateRole(role.name));
            }
            if roles.contains_key(&role.id) {
                return Err(CatalogError::DuplicateRole(role.id.as_uuid().to_string()));
            }
            role_permissions.insert(role.id, granted.into_iter().collect::<BTreeSet<_>>());
            roles.insert(role.id, role);
        }

        let mut graph = ImplicationGraph::new();
        for (from, to) in self.implications {
            let context = || format!("implication '{from}' -> '{to}'");
            require_known(&context, &from)?;
            require_known(&context, &to)?;
            let edge = Implication::new(from.clone(), to)
                .map_err(|_| CatalogError::SelfImplication(from.to_string()))?;
            graph.add(edge);
        }

        let catalog = Catalog::assemble(permissions, roles, role_permissions, graph);
        for cycle in catalog.graph.cycles() {
            let members: Vec<&str> = cycle.iter().map(PermissionName::as_str).collect();
            warn!(members = ?members, "permission catalog contains an implication cycle");
        }
        Ok(catalog)
    }
}
