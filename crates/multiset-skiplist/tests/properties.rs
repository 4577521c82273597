#![allow(unused_crate_dependencies, reason = "These are tests, not the main crate.")]

//! Property-based tests for the multiset operations.

use std::collections::BTreeMap;

use proptest::prelude::*;

use multiset_skiplist::{DefaultComparator, MultisetSkiplist};


#[derive(Clone, Debug)]
enum Op {
    Insert(u8),
    Erase(u8),
    /// Erase the `n % len`-th entry by cursor.
    EraseNth(usize),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0_u8..32).prop_map(Op::Insert),
        1 => (0_u8..32).prop_map(Op::Erase),
        1 => any::<usize>().prop_map(Op::EraseNth),
    ]
}

/// Sorted entries of a multiset, given as counts.
fn expand(model: &BTreeMap<u8, usize>) -> Vec<u8> {
    model
        .iter()
        .flat_map(|(&value, &count)| std::iter::repeat_n(value, count))
        .collect()
}

fn apply(list: &mut MultisetSkiplist<u8>, model: &mut BTreeMap<u8, usize>, op: &Op) {
    match *op {
        Op::Insert(value) => {
            list.insert(value);
            *model.entry(value).or_insert(0) += 1;
        }
        Op::Erase(value) => {
            list.erase(&value);
            model.remove(&value);
        }
        Op::EraseNth(n) => {
            if list.is_empty() {
                return;
            }
            let mut cursor = list.begin();
            for _ in 0..n % list.len() {
                cursor = list.next(cursor);
            }
            let Some(&value) = list.get(cursor) else {
                return;
            };
            list.erase_at(cursor);

            if let Some(count) = model.get_mut(&value) {
                *count -= 1;
                if *count == 0 {
                    model.remove(&value);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Iteration yields every inserted entry, in sorted order, with duplicates.
    #[test]
    fn iteration_is_sorted(values in prop::collection::vec(any::<i16>(), 0..200), seed: u64) {
        let mut list = MultisetSkiplist::new_seeded(DefaultComparator, seed);
        list.extend(values.iter().copied());

        let mut sorted = values;
        sorted.sort_unstable();

        prop_assert_eq!(list.len(), sorted.len());
        prop_assert!(list.iter().eq(sorted.iter()));
        prop_assert!(list.iter().rev().eq(sorted.iter().rev()));
    }

    /// Any sequence of operations agrees with a map from values to their counts.
    #[test]
    fn operations_match_counting_model(
        ops in prop::collection::vec(arbitrary_op(), 0..150),
        seed: u64,
    ) {
        let mut list = MultisetSkiplist::new_seeded(DefaultComparator, seed);
        let mut model = BTreeMap::new();

        for op in &ops {
            apply(&mut list, &mut model, op);
            prop_assert_eq!(list.len(), model.values().sum::<usize>());
        }

        let expected = expand(&model);
        prop_assert!(list.iter().eq(expected.iter()));

        for value in 0_u8..32 {
            let count = model.get(&value).copied().unwrap_or(0);
            prop_assert_eq!(list.count(&value), count);
            prop_assert_eq!(list.contains(&value), count > 0);

            let (first, last) = list.equal_range(&value);
            prop_assert_eq!(list.iter_range(first, last).count(), count);
            prop_assert_eq!(first == last, count == 0);

            let found = list.find(&value);
            if count == 0 {
                prop_assert!(found.is_end());
            } else {
                prop_assert_eq!(found, first);
                prop_assert_eq!(list.get(found), Some(&value));
            }
        }
    }

    /// Walking forwards and then backwards visits every position in both directions.
    #[test]
    fn cursors_step_symmetrically(values in prop::collection::vec(any::<u8>(), 0..100), seed: u64) {
        let mut list = MultisetSkiplist::new_seeded(DefaultComparator, seed);
        list.extend(values.iter().copied());

        let mut forwards = vec![list.before_begin()];
        let mut cursor = list.begin();
        while !list.is_end(cursor) {
            forwards.push(cursor);
            cursor = list.next(cursor);
        }
        prop_assert_eq!(forwards.len(), values.len() + 1);

        let mut backwards = Vec::new();
        let mut cursor = list.end();
        loop {
            cursor = list.prev(cursor);
            backwards.push(cursor);
            if cursor.is_before_first() {
                break;
            }
        }
        backwards.reverse();
        prop_assert_eq!(forwards, backwards);
    }

    /// Erasing by value returns the greatest remaining entry less than the value.
    #[test]
    fn erase_returns_predecessor(
        values in prop::collection::vec(0_u8..16, 1..80),
        target in 0_u8..16,
        seed: u64,
    ) {
        let mut list = MultisetSkiplist::new_seeded(DefaultComparator, seed);
        list.extend(values.iter().copied());

        let present = values.contains(&target);
        let before = list.erase(&target);

        if present {
            let expected = values.iter().filter(|&&value| value < target).max();
            prop_assert_eq!(list.get(before), expected);
            prop_assert_eq!(before.is_before_first(), expected.is_none());
        } else {
            prop_assert!(before.is_end());
        }
        prop_assert!(!list.contains(&target));
    }
}
