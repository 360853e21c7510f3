//! R*-tree topological split.
//!
//! Items are sorted by each of the four MBR bounds; every split position of
//! every ordering that leaves at least `min_size` items on both sides is a
//! candidate. The candidate with the lowest metric wins, ties going to the
//! lowest area sum and then to the first candidate encountered.

use std::cmp::Ordering;

use super::{take_all, ListPair, ListPairMetric};
use crate::geometry::{HasMbr, Rectangle};

type BoundFn = fn(&Rectangle) -> f64;

const ORDERINGS: [BoundFn; 4] = [|r| r.x1, |r| r.x2, |r| r.y1, |r| r.y2];

struct Candidate {
    ordering: usize,
    split_at: usize,
    score: f64,
    area_sum: f64,
    mbr1: Rectangle,
    mbr2: Rectangle,
}

pub(super) fn split<T: HasMbr>(items: Vec<T>, min_size: usize, metric: ListPairMetric) -> ListPair<T> {
    let mbrs: Vec<Rectangle> = items.iter().map(HasMbr::mbr).collect();
    let n = mbrs.len();
    let lower = min_size.max(1);
    // with exactly 2 * min_size items the only valid split is the midpoint
    let upper = if n - lower > lower { n - lower } else { n - lower + 1 };

    let orders: Vec<Vec<usize>> = ORDERINGS
        .iter()
        .map(|bound| sorted_by(&mbrs, *bound))
        .collect();

    let mut best: Option<Candidate> = None;
    for (ordering, order) in orders.iter().enumerate() {
        let prefix = running_union(order.iter().map(|&i| mbrs[i]));
        let mut suffix = running_union(order.iter().rev().map(|&i| mbrs[i]));
        suffix.reverse();

        for split_at in lower..upper {
            let mbr1 = prefix[split_at - 1];
            let mbr2 = suffix[split_at];
            let area_sum = mbr1.area() + mbr2.area();
            let score = match metric {
                ListPairMetric::AreaSum => area_sum,
                ListPairMetric::Overlap => mbr1.intersection_area(&mbr2),
            };
            let better = match &best {
                None => true,
                Some(b) => score < b.score || (score == b.score && area_sum < b.area_sum),
            };
            if better {
                best = Some(Candidate {
                    ordering,
                    split_at,
                    score,
                    area_sum,
                    mbr1,
                    mbr2,
                });
            }
        }
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    match best {
        Some(candidate) => {
            let order = &orders[candidate.ordering];
            let first = take_all(&mut slots, &order[..candidate.split_at]);
            let second = take_all(&mut slots, &order[candidate.split_at..]);
            ListPair::from_parts(first, candidate.mbr1, second, candidate.mbr2)
        }
        // only possible for fewer than two items, which Splitter::split rejects
        None => {
            let all: Vec<T> = slots.into_iter().flatten().collect();
            ListPair::new(all, Vec::new())
        }
    }
}

fn sorted_by(mbrs: &[Rectangle], bound: BoundFn) -> Vec<usize> {
    let mut order: Vec<usize> = (0..mbrs.len()).collect();
    order.sort_by(|&a, &b| {
        bound(&mbrs[a])
            .partial_cmp(&bound(&mbrs[b]))
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// `out[i]` is the union of the first `i + 1` rectangles.
fn running_union(rects: impl Iterator<Item = Rectangle>) -> Vec<Rectangle> {
    let mut out: Vec<Rectangle> = Vec::new();
    for rect in rects {
        let next = match out.last() {
            Some(acc) => acc.add(&rect),
            None => rect,
        };
        out.push(next);
    }
    out
}
