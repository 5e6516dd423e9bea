//! Implication expansion.
//!
//! Starting from the explicit frontier, each held permission propagates its
//! scope to the permissions it implies. Expansion is a work-list fixed point:
//! a permission is (re)descended only when it is reached at a strictly wider
//! scope than it has been resolved at so far, which bounds the work on cyclic
//! graphs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use arbor_catalog::ImplicationGraph;
use arbor_core::{PermissionName, ScopePath};

use crate::candidate::Candidate;

/// Per-permission expansion state.
#[derive(Debug)]
enum State {
    /// Descended at this scope; reaching it again at the same or a narrower
    /// scope adds nothing.
    Resolved { scope: ScopePath },
}

impl State {
    fn improved_by(&self, scope: &ScopePath) -> bool {
        match self {
            Self::Resolved { scope: current } => {
                ScopePath::widest_order(scope, current) == Ordering::Less
            },
        }
    }
}

/// Every implied candidate reachable from `frontier`.
///
/// Each candidate inherits the scope of the frontier entry it was derived
/// from. All candidates are returned, including ones later dominated, so the
/// final reduction sees the full picture.
pub(crate) fn expand(
    graph: &ImplicationGraph,
    frontier: &BTreeMap<PermissionName, Candidate>,
) -> Vec<(PermissionName, Candidate)> {
    let mut states: BTreeMap<PermissionName, State> = BTreeMap::new();
    let mut work: VecDeque<(PermissionName, ScopePath)> = VecDeque::new();

    for (name, candidate) in frontier {
        states.insert(
            name.clone(),
            State::Resolved {
                scope: candidate.scope.clone(),
            },
        );
        work.push_back((name.clone(), candidate.scope.clone()));
    }

    let mut implied = Vec::new();
    while let Some((holder, scope)) = work.pop_front() {
        for target in graph.direct_implications(&holder) {
            implied.push((
                target.clone(),
                Candidate::implied(scope.clone(), holder.clone()),
            ));

            let descend = states
                .get(target)
                .is_none_or(|state| state.improved_by(&scope));
            if descend {
                states.insert(
                    target.clone(),
                    State::Resolved {
                        scope: scope.clone(),
                    },
                );
                work.push_back((target.clone(), scope.clone()));
            }
        }
    }

    implied
}
