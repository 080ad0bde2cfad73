//! Helpers shared by the property tests.

use std::collections::HashSet;
use std::hash::Hash;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

pub(crate) fn all_distinct<T: Eq + Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item))
}

/// Pair every surviving source position with the target position it ends up
/// at, checking that no position is listed twice along the way.
///
/// `moved` sources index the source with `deleted` removed. Survivors that
/// did not move keep their order and fill the target positions that are
/// neither inserted nor a move target.
pub(crate) fn pair_positions(
    source_len: usize,
    target_len: usize,
    deleted: &[usize],
    inserted: &[usize],
    moved: &[(usize, usize)],
) -> Result<Vec<(usize, usize)>, TestCaseError> {
    prop_assert!(deleted.iter().all(|&index| index < source_len));
    prop_assert!(inserted.iter().all(|&index| index < target_len));

    let survivors: Vec<usize> = (0..source_len)
        .filter(|index| !deleted.contains(index))
        .collect();

    let mut pairs = Vec::with_capacity(survivors.len());
    for &(source, target) in moved {
        prop_assert!(source < survivors.len(), "move source {} out of range", source);
        prop_assert!(target < target_len, "move target {} out of range", target);
        pairs.push((survivors[source], target));
    }

    let moved_sources: Vec<usize> = pairs.iter().map(|&(source, _)| source).collect();
    let moved_targets: Vec<usize> = pairs.iter().map(|&(_, target)| target).collect();

    let listed_sources: Vec<usize> = deleted.iter().chain(&moved_sources).copied().collect();
    let listed_targets: Vec<usize> = inserted.iter().chain(&moved_targets).copied().collect();
    prop_assert!(all_distinct(&listed_sources), "source listed twice: {:?}", listed_sources);
    prop_assert!(all_distinct(&listed_targets), "target listed twice: {:?}", listed_targets);

    let unmoved: Vec<usize> = survivors
        .into_iter()
        .filter(|index| !moved_sources.contains(index))
        .collect();
    let unlisted: Vec<usize> = (0..target_len)
        .filter(|index| !listed_targets.contains(index))
        .collect();
    prop_assert_eq!(unmoved.len(), unlisted.len());

    pairs.extend(unmoved.into_iter().zip(unlisted));
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_unmoved_survivors_in_order() {
        // source [a, x, b, c] -> target [c, a, y, b]: x deleted, y inserted,
        // c moved from post-delete index 2.
        let pairs = pair_positions(4, 4, &[1], &[2], &[(2, 0)]).unwrap();
        assert_eq!(pairs, vec![(3, 0), (0, 1), (2, 3)]);
    }

    #[test]
    fn rejects_a_position_listed_twice() {
        assert!(pair_positions(2, 2, &[], &[0], &[(0, 0)]).is_err());
        assert!(pair_positions(2, 1, &[0], &[], &[(0, 0), (0, 0)]).is_err());
    }
}
