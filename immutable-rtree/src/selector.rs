//! Subtree selection during insertion.

use crate::geometry::{HasMbr, Rectangle};

/// Strategy choosing which child subtree receives a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    /// Child whose MBR grows the least; ties go to the smaller resulting
    /// area, then to the first candidate.
    #[default]
    MinimalAreaIncrease,
    /// Child whose enlarged MBR overlaps its siblings the least (R*-tree);
    /// ties are resolved by [`Selector::MinimalAreaIncrease`] over the tied
    /// candidates.
    MinimalOverlap,
}

impl Selector {
    /// Returns the index of the candidate that should receive `mbr`.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty.
    pub fn select<T: HasMbr>(&self, mbr: &Rectangle, candidates: &[T]) -> usize {
        assert!(!candidates.is_empty(), "selector needs at least one candidate");
        match self {
            Selector::MinimalAreaIncrease => {
                minimal_area_increase(mbr, candidates, 0..candidates.len())
            }
            Selector::MinimalOverlap => minimal_overlap(mbr, candidates),
        }
    }
}

fn minimal_area_increase<T: HasMbr>(
    mbr: &Rectangle,
    candidates: &[T],
    indices: impl IntoIterator<Item = usize>,
) -> usize {
    let mut best: Option<(usize, f64, f64)> = None;
    for i in indices {
        let current = candidates[i].mbr();
        let enlarged_area = current.add(mbr).area();
        let increase = enlarged_area - current.area();
        let better = match best {
            None => true,
            Some((_, best_increase, best_area)) => {
                increase < best_increase || (increase == best_increase && enlarged_area < best_area)
            }
        };
        if better {
            best = Some((i, increase, enlarged_area));
        }
    }
    best.map(|(i, _, _)| i).unwrap_or(0)
}

fn minimal_overlap<T: HasMbr>(mbr: &Rectangle, candidates: &[T]) -> usize {
    let mbrs: Vec<Rectangle> = candidates.iter().map(HasMbr::mbr).collect();
    let mut tied: Vec<usize> = Vec::new();
    let mut best_overlap = f64::INFINITY;

    for (i, candidate) in mbrs.iter().enumerate() {
        let enlarged = candidate.add(mbr);
        let overlap: f64 = mbrs
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| enlarged.intersection_area(other))
            .sum();

        if overlap < best_overlap {
            best_overlap = overlap;
            tied.clear();
            tied.push(i);
        } else if overlap == best_overlap {
            tied.push(i);
        }
    }

    if tied.len() == 1 {
        return tied[0];
    }
    minimal_area_increase(mbr, candidates, tied)
}
