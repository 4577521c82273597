//! An ordered multiset backed by a [skiplist] whose nodes live in an arena.
//!
//! [`MultisetSkiplist`] supports expected `O(log n)` insertion, lookup, and removal, keeps every
//! entry which compares equal to another (rather than deduplicating them), and exposes positions
//! as [`Cursor`]s which remain valid until the entry they refer to is erased.
//!
//! [skiplist]: https://en.wikipedia.org/wiki/Skip_list

#![cfg_attr(test, allow(unused_crate_dependencies, reason = "`proptest` is used by integration tests"))]

mod arena;
mod comparator;
mod cursor;
mod iter;
mod list;
mod node;
mod node_heights;


pub use seekable_iterator::{CursorIterator, Seekable};

pub use self::{
    arena::ReserveError,
    comparator::{Comparator, DefaultComparator, FnComparator},
    cursor::Cursor,
    iter::{IntoIter, Iter, SeekableIter},
    list::MultisetSkiplist,
    node_heights::MAX_HEIGHT,
};
