use std::iter::FusedIterator;

use seekable_iterator::{Comparator, CursorIterator, Seekable};

use crate::{
    arena::NodeArena,
    cursor::Cursor,
    list::MultisetSkiplist,
    node::{Link, Node},
};


// ================================
//  Iter
// ================================

/// An iterator over the entries of a [`MultisetSkiplist`] in a half-open range, in order.
///
/// It can be iterated from either end; see [`DoubleEndedIterator`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    arena:     &'a NodeArena<T>,
    /// The next node to yield from the front; `None` is the tail sentinel.
    front:     Link,
    /// The node after the next node to yield from the back; `None` is the tail sentinel.
    back:      Link,
    /// The list's last node, which precedes the tail sentinel.
    last:      Link,
    /// The number of nodes in `[front, back)`.
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// `remaining` must be the number of nodes reached by walking from `front` to `back`.
    #[inline]
    #[must_use]
    pub(crate) const fn new(
        arena: &'a NodeArena<T>,
        front: Link,
        back: Link,
        last: Link,
        remaining: usize,
    ) -> Self {
        Self { arena, front, back, last, remaining }
    }
}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            arena:     self.arena,
            front:     self.front,
            back:      self.back,
            last:      self.last,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let arena: &'a NodeArena<T> = self.arena;
        let node = &arena[self.front?];
        self.front = node.skip(0);
        self.remaining -= 1;
        Some(node.entry())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let arena: &'a NodeArena<T> = self.arena;
        let prev = match self.back {
            Some(index) => arena[index].back(),
            None        => self.last,
        };
        // Since nodes remain, there is a node before `back`.
        let node = &arena[prev?];
        self.back = prev;
        self.remaining -= 1;
        Some(node.entry())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// ================================
//  Seekable iter
// ================================

/// A cursor-iterator over a [`MultisetSkiplist`], which can seek to entries.
///
/// Conceptually, it is circular, and its initial position is before the first entry and after the
/// last entry. As such, it is not a [`FusedIterator`], as continuing to call `next()` at the
/// end of iteration wraps around to the start. (Note that if the skiplist is empty, then the
/// iterator will remain at that phantom position.)
///
/// See [`CursorIterator`] and [`Seekable`] for its methods.
#[derive(Debug)]
pub struct SeekableIter<'a, T, Cmp> {
    list:   &'a MultisetSkiplist<T, Cmp>,
    /// `None` is the phantom position, which is not at any entry.
    cursor: Link,
}

impl<'a, T, Cmp> SeekableIter<'a, T, Cmp> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(list: &'a MultisetSkiplist<T, Cmp>) -> Self {
        Self {
            list,
            cursor: None,
        }
    }

    /// Get a [`Cursor`] at the iterator's current entry.
    ///
    /// If the iterator is not [valid], this is the end position.
    ///
    /// [valid]: CursorIterator::valid
    #[must_use]
    pub fn position(&self) -> Cursor {
        match self.cursor {
            Some(index) => self.list.cursor_at(index),
            None        => self.list.end(),
        }
    }

    fn node_entry(&self) -> Option<&'a T> {
        let list: &'a MultisetSkiplist<T, Cmp> = self.list;
        self.cursor.and_then(|index| list.arena().get(index)).map(Node::entry)
    }
}

impl<T, Cmp> Clone for SeekableIter<'_, T, Cmp> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            list:   self.list,
            cursor: self.cursor,
        }
    }
}

impl<'a, T, Cmp> Iterator for SeekableIter<'a, T, Cmp> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor = match self.cursor {
            Some(index) => self.list.arena()[index].skip(0),
            None        => self.list.head_skip(0),
        };

        self.node_entry()
    }
}

impl<'a, T, Cmp> CursorIterator for SeekableIter<'a, T, Cmp> {
    #[inline]
    fn valid(&self) -> bool {
        self.cursor.is_some()
    }

    #[inline]
    fn current(&self) -> Option<&'a T> {
        self.node_entry()
    }

    fn prev(&mut self) -> Option<&'a T> {
        self.cursor = match self.cursor {
            Some(index) => self.list.arena()[index].back(),
            None        => self.list.last_link(),
        };

        self.node_entry()
    }
}

impl<T, Cmp: Comparator<T>> Seekable<T, Cmp> for SeekableIter<'_, T, Cmp> {
    #[inline]
    fn reset(&mut self) {
        self.cursor = None;
    }

    /// Move to the first entry which is greater than or equal to `min_bound`, if any.
    fn seek(&mut self, min_bound: &T) {
        self.cursor = self.list.skip_of(self.list.find_prev(min_bound), 0);
    }

    /// Move to the last entry which is strictly less than `strict_upper_bound`, if any.
    fn seek_before(&mut self, strict_upper_bound: &T) {
        self.cursor = self.list.find_prev(strict_upper_bound);
    }

    #[inline]
    fn seek_to_first(&mut self) {
        self.cursor = self.list.head_skip(0);
    }

    #[inline]
    fn seek_to_last(&mut self) {
        self.cursor = self.list.last_link();
    }
}

// ================================
//  Owning iter
// ================================

/// An owning iterator over the entries of a [`MultisetSkiplist`], in order.
#[derive(Debug)]
pub struct IntoIter<T> {
    arena:     NodeArena<T>,
    /// The next node to yield from the front.
    front:     Link,
    /// The next node to yield from the back.
    back:      Link,
    remaining: usize,
}

impl<T> IntoIter<T> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(arena: NodeArena<T>, front: Link, back: Link, len: usize) -> Self {
        Self {
            arena,
            front,
            back,
            remaining: len,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.arena.free(self.front?)?;
        self.front = node.skip(0);
        self.remaining -= 1;
        Some(node.into_entry())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.arena.free(self.back?)?;
        self.back = node.back();
        self.remaining -= 1;
        Some(node.into_entry())
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
