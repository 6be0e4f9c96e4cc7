//! Keyed reconciliation of visual record sets.
//!
//! Records are matched by key. Records that appear or disappear get a synthesized boundary so the
//! view layer can grow them out of (or collapse them into) a neighbour instead of popping. The
//! exit rule is the enter rule with its arguments swapped, so enter and exit animations mirror
//! each other.

use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A record that can be reconciled across draws.
pub trait Keyed {
    /// Stable identity across draws.
    fn key(&self) -> &str;

    /// Records only look for neighbours inside the same scope (e.g. one stacked column).
    fn scope(&self) -> &str {
        ""
    }

    /// Interval occupied by the record along its animated axis, as `(start, end)`.
    fn extent(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    /// Boundary used when no matched neighbour exists, in extent units.
    fn origin(&self) -> f64 {
        ORIGIN
    }
}

/// A record entering or leaving, with the boundary it grows from or collapses into.
#[derive(Clone, Debug, PartialEq)]
pub struct Transitioned<T> {
    pub record: T,
    pub boundary: f64,
}

/// A record present on both sides. `current` is authoritative.
#[derive(Clone, Debug, PartialEq)]
pub struct Updated<T> {
    pub previous: T,
    pub current: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled<T> {
    pub entering: Vec<Transitioned<T>>,
    pub updating: Vec<Updated<T>>,
    pub exiting: Vec<Transitioned<T>>,
}

impl<T> Default for Reconciled<T> {
    fn default() -> Self {
        Self {
            entering: Vec::new(),
            updating: Vec::new(),
            exiting: Vec::new(),
        }
    }
}

impl<T: Keyed> Reconciled<T> {
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.updating.is_empty() && self.exiting.is_empty()
    }

    pub fn entering_keys(&self) -> Vec<&str> {
        self.entering.iter().map(|t| t.record.key()).collect()
    }

    pub fn updating_keys(&self) -> Vec<&str> {
        self.updating.iter().map(|u| u.current.key()).collect()
    }

    pub fn exiting_keys(&self) -> Vec<&str> {
        self.exiting.iter().map(|t| t.record.key()).collect()
    }

    /// Records that remain on screen after this pass, in current order.
    pub fn live_len(&self) -> usize {
        self.entering.len() + self.updating.len()
    }
}

/// Origin used when an entering or exiting record has no matched neighbour.
pub const ORIGIN: f64 = 0.0;

/// Partitions `current` against `previous` by key.
///
/// Keys are unique on each side of the result: when a set repeats a key, the first record wins
/// and the later ones are dropped.
pub fn reconcile<T: Keyed + Clone>(previous: &[T], current: &[T]) -> Reconciled<T> {
    let previous_index = index_by_key(previous);
    let current_index = index_by_key(current);

    let mut out = Reconciled::default();

    for (i, record) in current.iter().enumerate() {
        if current_index.get(record.key()) != Some(&i) {
            warn!(key = record.key(), "duplicate key dropped from the visual set");
            continue;
        }
        match previous_index.get(record.key()) {
            Some(&j) => out.updating.push(Updated {
                previous: previous[j].clone(),
                current: record.clone(),
            }),
            None => out.entering.push(Transitioned {
                record: record.clone(),
                boundary: neighbour_boundary(i, current, previous, &previous_index),
            }),
        }
    }

    let mut exited: HashSet<&str> = HashSet::new();
    for (i, record) in previous.iter().enumerate() {
        if !current_index.contains_key(record.key()) && exited.insert(record.key()) {
            out.exiting.push(Transitioned {
                record: record.clone(),
                boundary: neighbour_boundary(i, previous, current, &current_index),
            });
        }
    }

    out
}

/// Walks back from `at` over same-scope siblings in `side` and returns the end of the first one
/// that also exists in `other` (read from `other`).
fn neighbour_boundary<T: Keyed>(
    at: usize,
    side: &[T],
    other: &[T],
    other_index: &HashMap<&str, usize>,
) -> f64 {
    let scope = side[at].scope();
    side[..at]
        .iter()
        .rev()
        .filter(|sibling| sibling.scope() == scope)
        .find_map(|sibling| other_index.get(sibling.key()))
        .map(|&j| other[j].extent().1)
        .unwrap_or_else(|| side[at].origin())
}

/// First occurrence wins when a set carries duplicate keys.
fn index_by_key<T: Keyed>(records: &[T]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        index.entry(record.key()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Seg {
        key: &'static str,
        scope: &'static str,
        end: f64,
    }

    impl Keyed for Seg {
        fn key(&self) -> &str {
            self.key
        }
        fn scope(&self) -> &str {
            self.scope
        }
        fn extent(&self) -> (f64, f64) {
            (0.0, self.end)
        }
    }

    fn seg(key: &'static str, end: f64) -> Seg {
        Seg { key, scope: "", end }
    }

    #[test]
    fn test_entering_splits_from_previous_neighbour() {
        let previous = vec![seg("A", 4.0)];
        let current = vec![seg("A", 4.0), seg("B", 0.0)];
        let result = reconcile(&previous, &current);
        assert_eq!(result.entering_keys(), vec!["B"]);
        assert_eq!(result.entering[0].boundary, 4.0);
        assert_eq!(result.updating_keys(), vec!["A"]);
        assert!(result.exiting.is_empty());
    }

    #[test]
    fn test_boundary_reads_previous_extent() {
        // The neighbour moved; birth uses where it was, not where it is going.
        let previous = vec![seg("A", 4.0)];
        let current = vec![seg("A", 9.0), seg("B", 12.0)];
        let result = reconcile(&previous, &current);
        assert_eq!(result.entering[0].boundary, 4.0);
    }

    #[test]
    fn test_no_neighbour_uses_origin() {
        let result = reconcile(&[seg("A", 3.0)], &[seg("B", 2.0), seg("A", 3.0)]);
        assert_eq!(result.entering[0].boundary, ORIGIN);
    }

    #[test]
    fn test_exit_collapses_into_current_neighbour() {
        let previous = vec![seg("A", 2.0), seg("B", 5.0), seg("C", 7.0)];
        let current = vec![seg("A", 3.0), seg("C", 7.0)];
        let result = reconcile(&previous, &current);
        assert_eq!(result.exiting_keys(), vec!["B"]);
        assert_eq!(result.exiting[0].boundary, 3.0);
    }

    #[test]
    fn test_scope_limits_neighbours() {
        let previous = vec![Seg { key: "x1", scope: "x", end: 6.0 }];
        let current = vec![
            Seg { key: "x1", scope: "x", end: 6.0 },
            Seg { key: "y1", scope: "y", end: 2.0 },
        ];
        let result = reconcile(&previous, &current);
        assert_eq!(result.entering[0].boundary, ORIGIN);
    }

    #[test]
    fn test_empty_sets() {
        let result: Reconciled<Seg> = reconcile(&[], &[]);
        assert!(result.is_empty());
    }
}
