use geo::GeoFloat;
use itertools::Itertools;

use crate::segments::{Crossing, SegmentSet};

/// Brute-force search over all pairs.
///
/// Pairs `(i, j)` with `i < j` are tested in lexicographic order, so
/// the result is the lowest intersecting pair. Runs in O(n^2) time and
/// serves as the reference for the sweep.
pub fn find_intersection_naive<T: GeoFloat>(set: &SegmentSet<T>) -> Option<Crossing> {
    (0..set.len())
        .tuple_combinations::<(usize, usize)>()
        .find(|&(i, j)| set.intersect(i, j))
        .map(|(first, second)| Crossing { first, second })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollinearPolicy;

    #[test]
    fn test_small_sets() {
        let empty = SegmentSet::<f64>::new();
        assert_eq!(find_intersection_naive(&empty), None);

        let mut single = SegmentSet::new();
        single.add((0., 0.), (1., 1.)).unwrap();
        assert_eq!(find_intersection_naive(&single), None);
    }

    #[test]
    fn test_lowest_pair() -> anyhow::Result<()> {
        let mut set = SegmentSet::new();
        set.add((10., 10.), (11., 11.))?;
        set.add((0., 0.), (2., 2.))?;
        set.add((5., 0.), (5., 1.))?;
        set.add((0., 2.), (2., 0.))?;
        set.add((10., 11.), (11., 10.))?;

        // Both (0, 4) and (1, 3) cross; (0, 4) comes first.
        let crossing = find_intersection_naive(&set);
        assert_eq!(crossing, Some(Crossing { first: 0, second: 4 }));

        // Deterministic across runs.
        for _ in 0..3 {
            assert_eq!(find_intersection_naive(&set), crossing);
        }
        Ok(())
    }

    #[test]
    fn test_respects_policy() -> anyhow::Result<()> {
        let pairs = vec![((0., 0.), (1., 0.)), ((2., 0.), (3., 0.))];

        let mut overlap = SegmentSet::<f64>::with_policy(CollinearPolicy::Overlap);
        overlap.extend_from_pairs(pairs.clone())?;
        assert_eq!(find_intersection_naive(&overlap), None);

        let mut line = SegmentSet::<f64>::with_policy(CollinearPolicy::Line);
        line.extend_from_pairs(pairs)?;
        assert_eq!(
            find_intersection_naive(&line),
            Some(Crossing { first: 0, second: 1 })
        );
        Ok(())
    }
}
