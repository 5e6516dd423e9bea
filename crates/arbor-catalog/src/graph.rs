//! Permission implication graph.
//!
//! Edges read "holding `from` implies holding `to`". The graph only answers
//! direct-neighbour queries for the resolver, which performs its own
//! cycle-safe transitive expansion. Whole-graph reachability is used for
//! catalog validation and reporting.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use arbor_core::{Implication, PermissionName};

static NO_IMPLICATIONS: BTreeSet<PermissionName> = BTreeSet::new();

/// Directed graph over permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplicationGraph {
    edges: BTreeMap<PermissionName, BTreeSet<PermissionName>>,
}

impl ImplicationGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from edges. Duplicate edges collapse.
    #[must_use]
    pub fn from_edges(edges: impl IntoIterator<Item = Implication>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add(edge);
        }
        graph
    }

    /// Add an edge.
    pub fn add(&mut self, edge: Implication) {
        self.edges.entry(edge.from).or_default().insert(edge.to);
    }

    /// Permissions directly implied by `permission`. Empty when none.
    #[must_use]
    pub fn direct_implications(&self, permission: &PermissionName) -> &BTreeSet<PermissionName> {
        self.edges.get(permission).unwrap_or(&NO_IMPLICATIONS)
    }

    /// Every permission reachable from `permission` through one or more edges.
    ///
    /// Terminates on cyclic graphs. `permission` itself is included only if it
    /// lies on a cycle.
    #[must_use]
    pub fn reachable_from(&self, permission: &PermissionName) -> BTreeSet<PermissionName> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&PermissionName> =
            self.direct_implications(permission).iter().collect();

        while let Some(next) = queue.pop_front() {
            if seen.insert(next.clone()) {
                queue.extend(self.direct_implications(next));
            }
        }
        seen
    }

    /// Whether any edge points at `permission`.
    #[must_use]
    pub fn is_implied(&self, permission: &PermissionName) -> bool {
        self.edges.values().any(|targets| targets.contains(permission))
    }

    /// All edges in (from, to) order.
    pub fn edges(&self) -> impl Iterator<Item = (&PermissionName, &PermissionName)> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Groups of permissions that imply each other, each sorted, in order.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<PermissionName>> {
        let reach: BTreeMap<&PermissionName, BTreeSet<PermissionName>> = self
            .edges
            .keys()
            .map(|name| (name, self.reachable_from(name)))
            .collect();

        let mut groups: BTreeSet<Vec<PermissionName>> = BTreeSet::new();
        for (name, reachable) in &reach {
            if !reachable.contains(*name) {
                continue;
            }
            let group: Vec<PermissionName> = reachable
                .iter()
                .filter(|other| {
                    reach
                        .get(other)
                        .is_some_and(|back| back.contains(*name))
                })
                .cloned()
                .collect();
            groups.insert(group);
        }
        groups.into_iter().collect()
    }
}
