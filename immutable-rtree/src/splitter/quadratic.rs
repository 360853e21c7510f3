//! Guttman's quadratic split.

use super::{take_all, ListPair};
use crate::geometry::{HasMbr, Rectangle};

pub(super) fn split<T: HasMbr>(items: Vec<T>, min_size: usize) -> ListPair<T> {
    let mbrs: Vec<Rectangle> = items.iter().map(HasMbr::mbr).collect();
    let (seed1, seed2) = worst_combination(&mbrs);

    let mut group1 = vec![seed1];
    let mut group2 = vec![seed2];
    let mut mbr1 = mbrs[seed1];
    let mut mbr2 = mbrs[seed2];

    let remaining: Vec<usize> = (0..mbrs.len())
        .filter(|&i| i != seed1 && i != seed2)
        .collect();

    for (pos, &i) in remaining.iter().enumerate() {
        let left = remaining.len() - pos;

        // a group that can only reach min_size by taking everything left gets it
        if group1.len() + left <= min_size {
            for &j in &remaining[pos..] {
                mbr1 = mbr1.add(&mbrs[j]);
                group1.push(j);
            }
            break;
        }
        if group2.len() + left <= min_size {
            for &j in &remaining[pos..] {
                mbr2 = mbr2.add(&mbrs[j]);
                group2.push(j);
            }
            break;
        }

        let grown1 = mbr1.add(&mbrs[i]);
        let grown2 = mbr2.add(&mbrs[i]);
        let increase1 = grown1.area() - mbr1.area();
        let increase2 = grown2.area() - mbr2.area();

        let to_first = if increase1 != increase2 {
            increase1 < increase2
        } else if grown1.area() != grown2.area() {
            grown1.area() < grown2.area()
        } else {
            group1.len() <= group2.len()
        };

        if to_first {
            group1.push(i);
            mbr1 = grown1;
        } else {
            group2.push(i);
            mbr2 = grown2;
        }
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let first = take_all(&mut slots, &group1);
    let second = take_all(&mut slots, &group2);
    ListPair::from_parts(first, mbr1, second, mbr2)
}

/// Indices of the pair wasting the most area when grouped together; the
/// first maximum found wins.
pub(super) fn worst_combination(mbrs: &[Rectangle]) -> (usize, usize) {
    let mut worst = (0, 1);
    let mut max_dead_space = f64::NEG_INFINITY;
    for i in 0..mbrs.len() {
        for j in (i + 1)..mbrs.len() {
            let dead_space = mbrs[i].add(&mbrs[j]).area() - mbrs[i].area() - mbrs[j].area();
            if dead_space > max_dead_space {
                max_dead_space = dead_space;
                worst = (i, j);
            }
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn r(n: i32) -> Rectangle {
        let x = n as f64;
        Rectangle::new(x, x, x + 1.0, x + 1.0)
    }

    fn xs(group: &[Rectangle]) -> HashSet<i64> {
        group.iter().map(|r| r.x1 as i64).collect()
    }

    #[test]
    fn test_worst_combination_on_three() {
        assert_eq!(worst_combination(&[r(1), r(100), r(3)]), (0, 1));
    }

    #[test]
    fn test_worst_combination_on_two() {
        assert_eq!(worst_combination(&[r(1), r(2)]), (0, 1));
    }

    #[test]
    fn test_worst_combination_on_four() {
        assert_eq!(worst_combination(&[r(2), r(1), r(3), r(4)]), (1, 3));
    }

    #[test]
    fn test_split_four_groups_neighbours() {
        let pair = split(vec![r(1), r(2), r(100), r(101)], 2);
        assert_eq!(xs(pair.group1()), HashSet::from([1, 2]));
        assert_eq!(xs(pair.group2()), HashSet::from([100, 101]));
    }

    #[test]
    fn test_split_five() {
        let pair = split(vec![r(1), r(2), r(100), r(101), r(103)], 2);
        assert_eq!(xs(pair.group1()), HashSet::from([1, 2]));
        assert_eq!(xs(pair.group2()), HashSet::from([100, 101, 103]));
    }

    #[test]
    fn test_split_forces_remaining_into_small_group() {
        // without the minimum every far item would join the second group
        let pair = split(vec![r(1), r(100), r(101), r(102), r(103)], 2);
        assert_eq!(pair.group1().len(), 2);
        assert_eq!(pair.group2().len(), 3);
        assert!(xs(pair.group1()).contains(&1));
    }

    #[test]
    fn test_full_tie_goes_to_smaller_group() {
        // collinear points: every increase and every grown area is zero
        let points: Vec<Rectangle> = (0..5).map(|x| Rectangle::from_point(x as f64, 0.0)).collect();
        let pair = split(points, 1);
        assert_eq!(xs(pair.group1()), HashSet::from([0, 2, 4]));
        assert_eq!(xs(pair.group2()), HashSet::from([1, 3]));
    }

    #[test]
    fn test_split_mbrs_match_groups() {
        let pair = split(vec![r(1), r(2), r(100), r(101), r(103), r(104)], 2);
        assert_eq!(pair.mbr1(), super::super::union_mbr(pair.group1()));
        assert_eq!(pair.mbr2(), super::super::union_mbr(pair.group2()));
    }
}
