//! Widest-scope reduction.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Keep, per key, the single most preferred value.
///
/// `prefer(a, b) == Less` means `a` beats `b`. Because `prefer` is a total
/// order, the result does not depend on input order.
pub(crate) fn widest_by_key<K, V, I, F>(items: I, prefer: F) -> BTreeMap<K, V>
where
    K: Ord,
    I: IntoIterator<Item = (K, V)>,
    F: Fn(&V, &V) -> Ordering,
{
    let mut best: BTreeMap<K, V> = BTreeMap::new();
    for (key, value) in items {
        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            },
            Entry::Occupied(mut slot) => {
                if prefer(&value, slot.get()) == Ordering::Less {
                    slot.insert(value);
                }
            },
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::ScopePath;

    fn scopes(items: &[(&'static str, &str)]) -> Vec<(&'static str, ScopePath)> {
        items
            .iter()
            .map(|(k, s)| (*k, ScopePath::parse(s).unwrap()))
            .collect()
    }

    #[test]
    fn test_keeps_widest_per_key() {
        let reduced = widest_by_key(
            scopes(&[
                ("view", "root.acme.branch1"),
                ("view", "root.acme"),
                ("update", "root.acme"),
                ("view", "root.acme.branch2"),
            ]),
            ScopePath::widest_order,
        );

        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced["view"].to_string(), "root.acme");
        assert_eq!(reduced["update"].to_string(), "root.acme");
    }

    #[test]
    fn test_equal_depth_tie_break_is_order_independent() {
        let forward = widest_by_key(
            scopes(&[("view", "root.beta"), ("view", "root.alpha")]),
            ScopePath::widest_order,
        );
        let backward = widest_by_key(
            scopes(&[("view", "root.alpha"), ("view", "root.beta")]),
            ScopePath::widest_order,
        );
        assert_eq!(forward, backward);
        assert_eq!(forward["view"].to_string(), "root.alpha");
    }

    #[test]
    fn test_empty_input() {
        let reduced: BTreeMap<&str, ScopePath> =
            widest_by_key(Vec::new(), ScopePath::widest_order);
        assert!(reduced.is_empty());
    }
}
