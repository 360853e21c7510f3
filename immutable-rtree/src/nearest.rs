//! k-nearest-neighbour search.
//!
//! Depth-first branch and bound: children are visited closest first and a
//! subtree is skipped once its MBR is farther than `max_distance` or, with
//! `k` results already held, no closer than the current k-th best.

use std::cmp::Ordering;

use crate::entry::Entry;
use crate::geometry::{Rectangle, Shape};
use crate::node::{Node, NodeRef};

/// Returns up to `k` entries within `max_distance` of `query`, nearest first,
/// each paired with its distance. Equal distances keep visitation order.
pub(crate) fn nearest<V, G>(
    root: Option<&NodeRef<V, G>>,
    query: &Rectangle,
    max_distance: f64,
    k: usize,
) -> Vec<(Entry<V, G>, f64)>
where
    V: Clone,
    G: Shape + Clone,
{
    let Some(root) = root else {
        return Vec::new();
    };
    if k == 0 {
        return Vec::new();
    }
    let mut best = Best {
        query,
        max_distance,
        k,
        found: Vec::new(),
    };
    best.visit(root);
    best.found
}

struct Best<'q, V, G> {
    query: &'q Rectangle,
    max_distance: f64,
    k: usize,
    found: Vec<(Entry<V, G>, f64)>,
}

impl<V: Clone, G: Shape + Clone> Best<'_, V, G> {
    /// Whether something at `distance` can still make it into the result.
    fn admits(&self, distance: f64) -> bool {
        if distance > self.max_distance {
            return false;
        }
        match self.found.get(self.k - 1) {
            Some((_, kth)) => distance < *kth,
            None => true,
        }
    }

    fn visit(&mut self, node: &NodeRef<V, G>) {
        match &**node {
            Node::Leaf(leaf) => {
                for entry in leaf.entries() {
                    let distance = entry.geometry().distance(self.query);
                    if self.admits(distance) {
                        let at = self.found.partition_point(|(_, d)| *d <= distance);
                        self.found.insert(at, (entry.clone(), distance));
                        self.found.truncate(self.k);
                    }
                }
            }
            Node::NonLeaf(non_leaf) => {
                let mut candidates: Vec<(&NodeRef<V, G>, f64)> = non_leaf
                    .children()
                    .iter()
                    .map(|child| (child, child.mbr().distance(self.query)))
                    .collect();
                candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

                for (child, distance) in candidates {
                    // candidates are sorted and the bound only shrinks
                    if !self.admits(distance) {
                        break;
                    }
                    self.visit(child);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::geometry::Geometry;
    use crate::insert;

    fn unit_box(n: i32) -> Entry<i32> {
        let x = n as f64;
        Entry::new(n, Geometry::rectangle(x, x, x + 1.0, x + 1.0))
    }

    fn build(values: impl IntoIterator<Item = i32>) -> NodeRef<i32> {
        let context = Context::default();
        let mut root: Option<NodeRef<i32>> = None;
        for n in values {
            root = Some(insert::insert(root.as_ref(), unit_box(n), &context));
        }
        root.unwrap()
    }

    fn values(found: &[(Entry<i32>, f64)]) -> Vec<i32> {
        found.iter().map(|(e, _)| *e.value()).collect()
    }

    #[test]
    fn test_nearest_two_of_four() {
        let root = build([1, 2, 10, 11]);
        let query = Rectangle::new(9.0, 9.0, 10.0, 10.0);
        let found = nearest(Some(&root), &query, 10.0, 2);
        assert_eq!(values(&found), vec![10, 11]);
        assert_eq!(found[0].1, 0.0);
    }

    #[test]
    fn test_nearest_respects_max_distance() {
        let root = build([1, 2, 10, 11]);
        let query = Rectangle::new(9.0, 9.0, 10.0, 10.0);
        let found = nearest(Some(&root), &query, 1.0, 4);
        assert_eq!(values(&found), vec![10]);
    }

    #[test]
    fn test_max_distance_is_inclusive() {
        let root = build([1, 2, 10, 11]);
        let query = Rectangle::new(9.0, 9.0, 10.0, 10.0);
        // box 11 starts at (11, 11), exactly sqrt(2) from the query corner
        let found = nearest(Some(&root), &query, 2.0f64.sqrt(), 4);
        assert_eq!(values(&found), vec![10, 11]);
        assert_eq!(found[1].1, 2.0f64.sqrt());
    }

    #[test]
    fn test_nearest_zero_k_or_empty_tree() {
        let root = build([1, 2, 3]);
        let query = Rectangle::from_point(0.0, 0.0);
        assert!(nearest(Some(&root), &query, f64::MAX, 0).is_empty());
        assert!(nearest::<i32, Geometry>(None, &query, f64::MAX, 3).is_empty());
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let values_in: Vec<i32> = (0..200).map(|i| (i * 73) % 200).collect();
        let root = build(values_in.iter().copied());
        let query = Rectangle::from_point(57.3, 61.8);

        let found = nearest(Some(&root), &query, f64::MAX, 10);
        assert_eq!(found.len(), 10);
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));

        let mut all: Vec<f64> = values_in
            .iter()
            .map(|n| unit_box(*n).geometry().distance(&query))
            .collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let distances: Vec<f64> = found.iter().map(|(_, d)| *d).collect();
        assert_eq!(distances, all[..10].to_vec());
    }

    #[test]
    fn test_ties_keep_first_visited() {
        let root = build([5, 5, 5]);
        let found = nearest(Some(&root), &Rectangle::from_point(0.0, 0.0), f64::MAX, 2);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, found[1].1);
    }
}
