//! Node splitting strategies.
//!
//! When a node overflows, its entries or children are handed to a
//! [`Splitter`] which partitions them into two groups, each holding at
//! least `min_size` items. Both strategies work on anything implementing
//! [`HasMbr`], so the same code splits leaf entries and child nodes.

mod quadratic;
mod topological;

use crate::geometry::{HasMbr, Rectangle};

/// Strategy partitioning an overflowing node into two groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Splitter {
    /// Guttman's quadratic split: worst pair seeds, greedy assignment.
    #[default]
    Quadratic,
    /// R*-tree topological split over the four axis orderings, scored by
    /// the given metric.
    Topological(ListPairMetric),
}

/// Score used by the topological splitter to compare candidate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListPairMetric {
    /// Sum of both group areas.
    AreaSum,
    /// Area shared by both groups.
    #[default]
    Overlap,
}

impl ListPairMetric {
    pub fn score<T>(&self, pair: &ListPair<T>) -> f64 {
        match self {
            ListPairMetric::AreaSum => pair.area_sum(),
            ListPairMetric::Overlap => pair.overlap(),
        }
    }
}

impl Splitter {
    /// Partitions `items` into two groups of at least `min_size` items each.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty or if `2 * min_size > items.len()`, since
    /// no valid partition exists. The tree only splits overflowing nodes of a
    /// validated context, so this never happens during insertion.
    pub fn split<T: HasMbr>(&self, items: Vec<T>, min_size: usize) -> ListPair<T> {
        assert!(!items.is_empty(), "cannot split an empty list of items");
        assert!(
            items.len() >= 2 && items.len() >= 2 * min_size,
            "cannot split {} items into two groups of at least {}",
            items.len(),
            min_size
        );
        let pair = match self {
            Splitter::Quadratic => quadratic::split(items, min_size),
            Splitter::Topological(metric) => topological::split(items, min_size, *metric),
        };
        log::trace!(
            "split into groups of {} and {}",
            pair.group1.len(),
            pair.group2.len()
        );
        pair
    }
}

/// Two groups produced by a split together with their MBRs.
#[derive(Debug, Clone)]
pub struct ListPair<T> {
    group1: Vec<T>,
    group2: Vec<T>,
    mbr1: Rectangle,
    mbr2: Rectangle,
}

impl<T> ListPair<T> {
    pub(crate) fn from_parts(group1: Vec<T>, mbr1: Rectangle, group2: Vec<T>, mbr2: Rectangle) -> Self {
        Self {
            group1,
            group2,
            mbr1,
            mbr2,
        }
    }

    pub fn group1(&self) -> &[T] {
        &self.group1
    }

    pub fn group2(&self) -> &[T] {
        &self.group2
    }

    pub fn mbr1(&self) -> Rectangle {
        self.mbr1
    }

    pub fn mbr2(&self) -> Rectangle {
        self.mbr2
    }

    /// Sum of the two group areas.
    pub fn area_sum(&self) -> f64 {
        self.mbr1.area() + self.mbr2.area()
    }

    /// Area covered by both groups.
    pub fn overlap(&self) -> f64 {
        self.mbr1.intersection_area(&self.mbr2)
    }

    /// Sum of the two group perimeters.
    pub fn margin_sum(&self) -> f64 {
        self.mbr1.margin() + self.mbr2.margin()
    }

    pub fn into_groups(self) -> (Vec<T>, Vec<T>) {
        (self.group1, self.group2)
    }
}

impl<T: HasMbr> ListPair<T> {
    /// Builds a pair from two non-empty groups, computing their MBRs.
    pub fn new(group1: Vec<T>, group2: Vec<T>) -> Self {
        let mbr1 = union_mbr(&group1);
        let mbr2 = union_mbr(&group2);
        Self::from_parts(group1, mbr1, group2, mbr2)
    }
}

pub(crate) fn union_mbr<T: HasMbr>(items: &[T]) -> Rectangle {
    items
        .iter()
        .map(HasMbr::mbr)
        .reduce(|acc, mbr| acc.add(&mbr))
        .unwrap_or_default()
}

/// Moves the items at `indices` out of `slots`, in the given order.
pub(crate) fn take_all<T>(slots: &mut [Option<T>], indices: &[usize]) -> Vec<T> {
    indices.iter().filter_map(|&i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: f64) -> Rectangle {
        Rectangle::new(n, n, n + 1.0, n + 1.0)
    }

    #[test]
    fn test_list_pair_metrics() {
        let pair = ListPair::new(vec![r(0.0), r(1.0)], vec![r(1.5)]);
        assert_eq!(pair.mbr1(), Rectangle::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(pair.area_sum(), 5.0);
        assert_eq!(pair.overlap(), 0.25);
        assert_eq!(pair.margin_sum(), 12.0);
    }

    #[test]
    fn test_metric_score() {
        let pair = ListPair::new(vec![r(0.0)], vec![r(5.0)]);
        assert_eq!(ListPairMetric::AreaSum.score(&pair), 2.0);
        assert_eq!(ListPairMetric::Overlap.score(&pair), 0.0);
    }

    #[test]
    fn test_every_splitter_keeps_all_items() {
        let items: Vec<Rectangle> = (0..9).map(|i| r((i * 7 % 9) as f64)).collect();
        for splitter in [
            Splitter::Quadratic,
            Splitter::Topological(ListPairMetric::AreaSum),
            Splitter::Topological(ListPairMetric::Overlap),
        ] {
            let pair = splitter.split(items.clone(), 3);
            assert!(pair.group1().len() >= 3, "{:?}", splitter);
            assert!(pair.group2().len() >= 3, "{:?}", splitter);
            assert_eq!(pair.group1().len() + pair.group2().len(), items.len());
        }
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn test_split_empty_panics() {
        Splitter::Quadratic.split(Vec::<Rectangle>::new(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot split 3 items")]
    fn test_split_unsatisfiable_min_size_panics() {
        Splitter::Quadratic.split(vec![r(0.0), r(1.0), r(2.0)], 2);
    }
}
