#![allow(unused_crate_dependencies, reason = "These are tests, not the main crate.")]

use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

use oorandom::Rand32;

use multiset_skiplist::{
    Comparator, CursorIterator as _, DefaultComparator, MultisetSkiplist, Seekable as _,
};


// ================================
//  Large list
// ================================

#[cfg_attr(miri, ignore)]
#[test]
fn many_insertions_erasures_and_reads() {
    const NUM_OPERATIONS: usize = 8192;
    const NUM_VALUES: u32 = 512;
    const SEEK_CHECK_LEN: usize = 4;

    let mut prng = Rand32::new(0x_1234_5678);
    let mut list = MultisetSkiplist::new_seeded(DefaultComparator, 0x_8765_4321);
    // Counts of each value. `BTreeMap` gives the correct order of the entries.
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();

    for _ in 0..NUM_OPERATIONS {
        let value = prng.rand_range(0..NUM_VALUES);

        // Mostly insert, so that the list grows.
        if prng.rand_range(0..4) == 0 {
            let was_present = counts.remove(&value).is_some();
            assert_eq!(list.erase(&value).is_end(), !was_present);
        } else {
            list.insert(value);
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    assert_eq!(list.len(), counts.values().sum::<usize>());

    // Check every possible value.
    for value in 0..NUM_VALUES {
        let count = counts.get(&value).copied().unwrap_or(0);
        assert_eq!(list.count(&value), count);
        assert_eq!(list.contains(&value), count > 0);

        let mut std_iter = counts
            .range(value..)
            .flat_map(|(&value, &count)| std::iter::repeat_n(value, count))
            .peekable();

        let mut iter = list.seekable_iter();
        iter.seek(&value);
        assert_eq!(iter.valid(), std_iter.peek().is_some());

        // Move back one entry, so that `next()` returns what `current()` currently does.
        iter.prev();
        assert!(iter.fuse().take(SEEK_CHECK_LEN).copied().eq(std_iter.take(SEEK_CHECK_LEN)));

        let mut iter = list.seekable_iter();
        iter.seek_before(&value);
        let expected_before = counts.range(..value).next_back().map(|(value, _)| value);
        assert_eq!(iter.current(), expected_before);
    }

    let expected: Vec<u32> = counts
        .iter()
        .flat_map(|(&value, &count)| std::iter::repeat_n(value, count))
        .collect();
    assert!(list.iter().eq(expected.iter()));
    assert!(list.into_iter().rev().eq(expected.into_iter().rev()));
}

#[cfg_attr(miri, ignore)]
#[test]
fn erase_every_entry_by_cursor() {
    let mut prng = Rand32::new(0x_0bad_cafe);
    let mut list = MultisetSkiplist::new_seeded(DefaultComparator, 7);
    list.extend((0..1000).map(|_| prng.rand_range(0..100)));

    // Repeatedly erase a random entry, stepping to it from the front.
    while !list.is_empty() {
        let steps = prng.rand_range(0..u32::try_from(list.len()).unwrap());
        let mut cursor = list.begin();
        for _ in 0..steps {
            cursor = list.next(cursor);
        }

        let expected_before = list.prev(cursor);
        let len = list.len();
        assert_eq!(list.erase_at(cursor), expected_before);
        assert_eq!(list.len(), len - 1);
        assert!(list.get(cursor).is_none());
    }

    assert_eq!(list.begin(), list.end());
}

// ================================
//  Broken comparators
// ================================

// The list does not promise anything about the order of entries with a comparator that is not
// a total order, but inserting and iterating should still work.
#[cfg_attr(miri, ignore)]
#[test]
fn broken_comparators() {
    #[derive(Debug)]
    struct BadComparator(RefCell<Rand32>);

    impl Comparator<u32> for BadComparator {
        fn cmp(&self, _lhs: &u32, _rhs: &u32) -> Ordering {
            match self.0.borrow_mut().rand_range(0..3) {
                0 => Ordering::Less,
                1 => Ordering::Equal,
                _ => Ordering::Greater,
            }
        }
    }

    let mut list = MultisetSkiplist::new_seeded(BadComparator(RefCell::new(Rand32::new(666))), 1);

    for i in 0..1024_u32 {
        list.insert(i);
    }

    // Stepping along the lowest level does not depend on the comparator.
    assert_eq!(list.iter().count(), 1024);
    assert_eq!(list.iter().rev().count(), 1024);

    let mut iteration_cap = 2000;
    let mut iter = list.seekable_iter();
    iter.seek(&512);
    while iter.prev().is_some() {
        if iteration_cap == 0 {
            break;
        }
        iteration_cap -= 1;
    }

    list.clear();
    assert!(list.is_empty());
}
