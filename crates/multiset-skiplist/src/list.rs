use std::fmt::{Debug, Formatter, Result as FmtResult};

use oorandom::Rand32;
use tracing::Level as LogLevel;

use crate::{
    arena::{NodeArena, NodeIndex, ReserveError},
    comparator::{Comparator, DefaultComparator},
    cursor::{Cursor, Position},
    iter::{IntoIter, Iter, SeekableIter},
    node::{Link, Node},
    node_heights::{MAX_HEIGHT, random_node_height},
};


/// Used if the OS cannot provide a seed for a skiplist's PRNG.
const FALLBACK_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

fn os_seed() -> u64 {
    match getrandom::u64() {
        Ok(seed) => seed,
        Err(err) => {
            tracing::event!(
                LogLevel::WARN,
                "could not seed a skiplist from the OS, using a fixed seed: {err}"
            );
            FALLBACK_SEED
        }
    }
}


/// An ordered multiset, implemented as a [skiplist] whose nodes live in an arena.
///
/// Entries are ordered by the provided [`Comparator`]. Entries which compare equal are all
/// retained, as distinct nodes. Insertion, lookup, and removal take expected `O(log n)` time.
///
/// Positions in the list are given by [`Cursor`]s, which do not borrow the list. Inserting never
/// invalidates a cursor; erasing only invalidates cursors at the erased entries.
///
/// The comparator must implement a total order. If it does not, the order of the entries and the
/// results of lookups are unspecified, and erasing entries may panic. No memory unsafety results
/// from it.
///
/// The list performs no internal synchronization. To share it between threads, put the whole
/// list behind a lock.
///
/// # Example
/// ```
/// use multiset_skiplist::MultisetSkiplist;
///
/// let mut list: MultisetSkiplist<u32> = MultisetSkiplist::new_seeded(Default::default(), 1);
/// for entry in [5, 1, 3, 3, 2] {
///     list.insert(entry);
/// }
///
/// assert!(list.iter().eq(&[1, 2, 3, 3, 5]));
/// assert_eq!(list.count(&3), 2);
///
/// // Erasing by value removes every equal entry, and returns the position before them.
/// let before = list.erase(&3);
/// assert_eq!(list.get(before), Some(&2));
/// assert_eq!(list.len(), 3);
/// ```
///
/// [skiplist]: https://en.wikipedia.org/wiki/Skip_list
pub struct MultisetSkiplist<T, Cmp = DefaultComparator> {
    cmp:            Cmp,
    arena:          NodeArena<T>,
    /// The forward links of the head sentinel.
    head:           [Link; MAX_HEIGHT],
    /// The backward link of the tail sentinel; that is, the last node.
    last:           Link,
    /// The greatest height of any node in the list. Head links at or above this level are `None`.
    current_height: usize,
    len:            usize,
    prng:           Rand32,
}

impl<T, Cmp> MultisetSkiplist<T, Cmp> {
    /// Create an empty skiplist, whose PRNG is seeded by the OS.
    #[inline]
    #[must_use]
    pub fn new(cmp: Cmp) -> Self {
        Self::new_seeded(cmp, os_seed())
    }

    /// Create an empty skiplist, whose PRNG is seeded with the provided `seed`.
    ///
    /// Two lists with the same seed which are given the same sequence of operations have
    /// identical structure.
    #[inline]
    #[must_use]
    pub fn new_seeded(cmp: Cmp, seed: u64) -> Self {
        Self::from_parts(cmp, NodeArena::new(), seed)
    }

    /// Create an empty skiplist with space for at least `capacity` entries, whose PRNG is seeded
    /// by the OS.
    #[inline]
    #[must_use]
    pub fn with_capacity(cmp: Cmp, capacity: usize) -> Self {
        Self::from_parts(cmp, NodeArena::with_capacity(capacity), os_seed())
    }

    #[inline]
    #[must_use]
    fn from_parts(cmp: Cmp, arena: NodeArena<T>, seed: u64) -> Self {
        Self {
            cmp,
            arena,
            head:           [None; MAX_HEIGHT],
            last:           None,
            current_height: 0,
            len:            0,
            prng:           Rand32::new(seed),
        }
    }

    /// The number of entries in the list.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &Cmp {
        &self.cmp
    }

    /// Reserve space for at least `additional` more entries.
    ///
    /// # Panics
    /// Panics if the new capacity would exceed the `u32::MAX` entries a skiplist can hold, or
    /// if the allocation fails.
    #[expect(clippy::panic, reason = "mirror the behavior of `Vec::reserve`")]
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            panic!("{err}");
        }
    }

    /// Try to reserve space for at least `additional` more entries.
    ///
    /// If this succeeds, the next `additional` insertions will not need to allocate space for
    /// nodes (though each node still allocates its own small array of links).
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        self.arena.try_reserve(additional)
    }

    /// Remove every entry from the list.
    ///
    /// Every node is visited exactly once, walking backwards from the last node. The space
    /// allocated for nodes is retained, and cursors to the removed entries become stale.
    pub fn clear(&mut self) {
        let mut freed = 0_usize;
        let mut current = self.last;

        while let Some(index) = current {
            current = self.arena.free(index).and_then(|node| node.back());
            freed += 1;
        }

        debug_assert_eq!(freed, self.len, "teardown should visit every node exactly once");
        debug_assert_eq!(self.arena.live(), 0, "teardown should free every node");

        self.head = [None; MAX_HEIGHT];
        self.last = None;
        self.current_height = 0;
        self.len = 0;

        tracing::event!(LogLevel::TRACE, "cleared skiplist, freeing {freed} nodes");
    }
}

// Cursors
impl<T, Cmp> MultisetSkiplist<T, Cmp> {
    /// A cursor at the first entry, or the end position if the list is empty.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.forward_cursor(self.head_skip(0))
    }

    /// The end position, after the last entry.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> Cursor {
        Cursor::END
    }

    /// The position before the first entry.
    ///
    /// Erasing the first entries of the list returns this position. It has no entry;
    /// [`next`] moves it to the first entry.
    ///
    /// [`next`]: MultisetSkiplist::next
    #[inline]
    #[must_use]
    pub const fn before_begin(&self) -> Cursor {
        Cursor::BEFORE_FIRST
    }

    /// Whether the cursor is at the end position, or is stale.
    #[inline]
    #[must_use]
    pub fn is_end(&self, cursor: Cursor) -> bool {
        match cursor.0 {
            Position::BeforeFirst => false,
            Position::At(key)     => self.arena.resolve(key).is_none(),
            Position::End         => true,
        }
    }

    /// Get the entry at the cursor.
    ///
    /// Returns `None` if the cursor is before the first entry, at the end, or stale.
    #[inline]
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Option<&T> {
        let index = self.resolve(cursor)?;
        self.arena.get(index).map(Node::entry)
    }

    /// Move the cursor forwards by one position.
    ///
    /// The position before the first entry moves to the first entry (or the end, if the list
    /// is empty). The end position, and stale cursors, move to the end position.
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Position::BeforeFirst => self.forward_cursor(self.head_skip(0)),
            Position::At(key) => match self.arena.resolve(key) {
                Some(index) => self.forward_cursor(self.arena[index].skip(0)),
                None        => Cursor::END,
            },
            Position::End => Cursor::END,
        }
    }

    /// Move the cursor backwards by one position.
    ///
    /// The first entry moves to the position before the first entry, which stays in place.
    /// The end position moves to the last entry (or before the first entry, if the list is
    /// empty). Stale cursors move to the end position.
    #[must_use]
    pub fn prev(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Position::BeforeFirst => Cursor::BEFORE_FIRST,
            Position::At(key) => match self.arena.resolve(key) {
                Some(index) => self.backward_cursor(self.arena[index].back()),
                None        => Cursor::END,
            },
            Position::End => self.backward_cursor(self.last),
        }
    }

    /// The smallest entry, if the list is nonempty.
    ///
    /// If several entries compare equal to the smallest, this is the first of them in iteration
    /// order.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.head_skip(0).map(|index| self.arena[index].entry())
    }

    /// The greatest entry, if the list is nonempty.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.last.map(|index| self.arena[index].entry())
    }

    /// Iterate over the entries in order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.arena, self.head_skip(0), None, self.last, self.len)
    }

    /// Iterate over the entries in the half-open range `[first, last)`.
    ///
    /// The position before the first entry is treated as the first entry, and stale cursors
    /// are treated as the end position. If `last` is not reachable by stepping forwards from
    /// `first` (for instance, if `last` comes before `first`), the range is empty.
    ///
    /// This walks the range once to count its entries.
    #[must_use]
    pub fn iter_range(&self, first: Cursor, last: Cursor) -> Iter<'_, T> {
        let front = self.forward_link(first);
        let back = self.forward_link(last);

        match self.span_len(front, back) {
            Some(len) => Iter::new(&self.arena, front, back, self.last, len),
            None      => Iter::new(&self.arena, back, back, self.last, 0),
        }
    }

    /// Get a seekable cursor-iterator over the list. It is initially not at any entry.
    #[inline]
    #[must_use]
    pub const fn seekable_iter(&self) -> SeekableIter<'_, T, Cmp> {
        SeekableIter::new(self)
    }
}

// Internal utilities, used here and by the iterators.
impl<T, Cmp> MultisetSkiplist<T, Cmp> {
    #[inline]
    #[must_use]
    pub(crate) const fn arena(&self) -> &NodeArena<T> {
        &self.arena
    }

    /// The link from the head sentinel at `level`.
    #[inline]
    #[must_use]
    pub(crate) fn head_skip(&self, level: usize) -> Link {
        self.head.get(level).copied().flatten()
    }

    /// The backward link of the tail sentinel.
    #[inline]
    #[must_use]
    pub(crate) const fn last_link(&self) -> Link {
        self.last
    }

    /// The forward link of `prev` at `level`, where a `None` predecessor is the head sentinel.
    #[inline]
    #[must_use]
    pub(crate) fn skip_of(&self, prev: Link, level: usize) -> Link {
        match prev {
            Some(index) => self.arena[index].skip(level),
            None        => self.head_skip(level),
        }
    }

    /// # Panics
    /// Panics if `level` is at least the height of `prev`.
    fn set_skip_of(&mut self, prev: Link, level: usize, link: Link) {
        match prev {
            Some(index) => self.arena[index].set_skip(level, link),
            #[expect(clippy::indexing_slicing, reason = "every level is below MAX_HEIGHT")]
            None => self.head[level] = link,
        }
    }

    /// Set the backward link of `next`, where a `None` successor is the tail sentinel.
    fn set_back_of(&mut self, next: Link, link: Link) {
        match next {
            Some(index) => self.arena[index].set_back(link),
            None        => self.last = link,
        }
    }

    /// Lower `current_height` past any levels which became empty.
    fn lower_height(&mut self) {
        while self.current_height > 0 && self.head_skip(self.current_height - 1).is_none() {
            self.current_height -= 1;
        }
    }

    #[must_use]
    pub(crate) fn cursor_at(&self, index: NodeIndex) -> Cursor {
        match self.arena.key(index) {
            Some(key) => Cursor(Position::At(key)),
            None      => Cursor::END,
        }
    }

    /// Convert a forward link into a cursor; the tail sentinel is the end position.
    #[must_use]
    fn forward_cursor(&self, link: Link) -> Cursor {
        match link {
            Some(index) => self.cursor_at(index),
            None        => Cursor::END,
        }
    }

    /// Convert a backward link into a cursor; the head sentinel is the position before
    /// the first entry.
    #[must_use]
    fn backward_cursor(&self, link: Link) -> Cursor {
        match link {
            Some(index) => self.cursor_at(index),
            None        => Cursor::BEFORE_FIRST,
        }
    }

    /// Convert a cursor into a forward link, for use as a bound of a half-open range.
    #[must_use]
    fn forward_link(&self, cursor: Cursor) -> Link {
        match cursor.0 {
            Position::BeforeFirst => self.head_skip(0),
            Position::At(key)     => self.arena.resolve(key),
            Position::End         => None,
        }
    }

    /// The number of nodes from `front` (inclusive) to `back` (exclusive) on the lowest level,
    /// or `None` if `back` is not reachable from `front`.
    fn span_len(&self, front: Link, back: Link) -> Option<usize> {
        let mut len = 0;
        let mut current = front;

        while current != back {
            current = self.arena[current?].skip(0);
            len += 1;
        }
        Some(len)
    }

    /// The index of the live node the cursor is at, if any.
    #[inline]
    #[must_use]
    fn resolve(&self, cursor: Cursor) -> Option<NodeIndex> {
        match cursor.0 {
            Position::At(key) => self.arena.resolve(key),
            Position::BeforeFirst | Position::End => None,
        }
    }
}

// Searching
impl<T, Cmp: Comparator<T>> MultisetSkiplist<T, Cmp> {
    /// Return `Some(node)` if the provided `link` sorts strictly less than the provided `entry`.
    /// The tail sentinel sorts after every entry.
    fn node_before_entry(&self, link: Link, entry: &T) -> Option<NodeIndex> {
        let index = link?;

        if self.cmp.cmp(self.arena[index].entry(), entry).is_lt() {
            Some(index)
        } else {
            None
        }
    }

    #[inline]
    fn node_equals_entry(&self, index: NodeIndex, entry: &T) -> bool {
        self.cmp.cmp(self.arena[index].entry(), entry).is_eq()
    }

    #[inline]
    fn nodes_equal(&self, lhs: NodeIndex, rhs: NodeIndex) -> bool {
        self.node_equals_entry(lhs, self.arena[rhs].entry())
    }

    /// Starting from `current` on `level`, move forwards while the next node is strictly less
    /// than `entry`, and return the last node reached.
    fn advance_on_level(&self, mut current: Link, level: usize, entry: &T) -> Link {
        while let Some(next) = self.node_before_entry(self.skip_of(current, level), entry) {
            current = Some(next);
        }
        current
    }

    /// Return the last node which is strictly less than `entry`, or `None` (the head sentinel)
    /// if there is no such node.
    #[must_use]
    pub(crate) fn find_prev(&self, entry: &T) -> Link {
        (0..self.current_height)
            .rev()
            .fold(None, |current, level| self.advance_on_level(current, level, entry))
    }

    /// For every level, find the last node on that level which is strictly less than `entry`,
    /// or `None` (the head sentinel) if there is no such node.
    ///
    /// Index `0` of the returned array is the same as [`find_prev`].
    ///
    /// [`find_prev`]: MultisetSkiplist::find_prev
    fn find_preceding_neighbors(&self, entry: &T) -> [Link; MAX_HEIGHT] {
        let mut prev = [None; MAX_HEIGHT];
        let mut current = None;

        for level in (0..self.current_height).rev() {
            current = self.advance_on_level(current, level, entry);

            #[expect(clippy::indexing_slicing, reason = "level < current_height <= MAX_HEIGHT")]
            #[expect(clippy::semicolon_outside_block, reason = "block needed for lint scope")]
            {
                prev[level] = current;
            }
        }

        prev
    }

    /// The first node equal to `entry`, and the first node after it which is not equal,
    /// as a half-open range of forward links, along with the number of nodes in the range.
    fn equal_links(&self, entry: &T) -> (Link, Link, usize) {
        let first = self.skip_of(self.find_prev(entry), 0);
        let mut last = first;
        let mut len = 0;

        while let Some(index) = last {
            if !self.node_equals_entry(index, entry) {
                break;
            }
            last = self.arena[index].skip(0);
            len += 1;
        }

        (first, last, len)
    }
}

// Operations which require a comparator
impl<T, Cmp: Comparator<T>> MultisetSkiplist<T, Cmp> {
    /// Insert an entry into the list, and return a cursor at it.
    ///
    /// Even if the entry compares equal to entries already in the list, it is added; the new
    /// entry is placed before the entries it compares equal to.
    ///
    /// # Panics
    /// Panics if the list already holds `u32::MAX - 1` entries.
    pub fn insert(&mut self, entry: T) -> Cursor {
        let prev = self.find_preceding_neighbors(&entry);
        let height = random_node_height(&mut self.prng);

        let node = self.arena.alloc(Node::new(entry, height, prev[0]));

        if height > self.current_height {
            self.current_height = height;
        }

        for (level, preceding) in prev.into_iter().take(height).enumerate() {
            // On level `level`, put `node` between `preceding` and `preceding`'s skip on the level.
            let next = self.skip_of(preceding, level);
            self.arena[node].set_skip(level, next);
            self.set_skip_of(preceding, level, Some(node));
        }

        let next = self.arena[node].skip(0);
        self.set_back_of(next, Some(node));

        self.len += 1;
        self.cursor_at(node)
    }

    /// Remove every entry which compares equal to `entry`.
    ///
    /// If any entry was removed, returns a cursor at the position immediately before the
    /// removed entries (which is [`before_begin`] if they were the first entries of the list).
    /// Note that this is the preceding position, not the following one. If no entry compared
    /// equal, nothing is changed, and the end position is returned.
    ///
    /// [`before_begin`]: MultisetSkiplist::before_begin
    pub fn erase(&mut self, entry: &T) -> Cursor {
        let prev = self.find_preceding_neighbors(entry);

        let mut first_removed: Link = None;
        let mut after_removed: Link = None;

        for level in (0..self.current_height).rev() {
            #[expect(clippy::indexing_slicing, reason = "level < current_height <= MAX_HEIGHT")]
            let preceding = prev[level];

            while let Some(index) = self.skip_of(preceding, level) {
                if !self.node_equals_entry(index, entry) {
                    break;
                }

                let next = self.arena[index].skip(level);
                self.set_skip_of(preceding, level, next);

                if level == 0 {
                    if first_removed.is_none() {
                        first_removed = Some(index);
                    }
                    after_removed = next;
                }
            }
        }

        let Some(first_removed) = first_removed else {
            return Cursor::END;
        };

        self.set_back_of(after_removed, prev[0]);

        // The removed nodes still link to each other on the lowest level.
        let mut current = Some(first_removed);
        while current != after_removed {
            let Some(node) = current.and_then(|index| self.arena.free(index)) else {
                break;
            };
            current = node.skip(0);
            self.len -= 1;
        }

        self.lower_height();
        self.backward_cursor(prev[0])
    }

    /// Remove exactly the entry at `cursor`, even if other entries compare equal to it.
    ///
    /// Returns a cursor at the position immediately before the removed entry (which is
    /// [`before_begin`] if it was the first entry). If the cursor is not at an entry of
    /// this list (for instance, if it is stale, or at the end), nothing is changed, and the end
    /// position is returned.
    ///
    /// [`before_begin`]: MultisetSkiplist::before_begin
    pub fn erase_at(&mut self, cursor: Cursor) -> Cursor {
        let Some(target) = self.resolve(cursor) else {
            tracing::event!(
                LogLevel::DEBUG,
                "erase_at was given a cursor which is not at an entry: {cursor:?}"
            );
            return Cursor::END;
        };

        let prev = self.find_preceding_neighbors(self.arena[target].entry());
        let mut contained = false;

        for level in (0..self.current_height).rev() {
            #[expect(clippy::indexing_slicing, reason = "level < current_height <= MAX_HEIGHT")]
            let mut current = prev[level];

            // Scan the run of equal entries on this level for `target` itself.
            while let Some(next) = self.skip_of(current, level) {
                if next == target {
                    let after = self.arena[target].skip(level);
                    self.set_skip_of(current, level, after);
                    if level == 0 {
                        contained = true;
                    }
                    break;
                }

                if !self.nodes_equal(next, target) {
                    break;
                }
                current = Some(next);
            }
        }

        if !contained {
            return Cursor::END;
        }
        let Some(node) = self.arena.free(target) else {
            return Cursor::END;
        };

        let back = node.back();
        self.set_back_of(node.skip(0), back);
        self.len -= 1;
        self.lower_height();

        self.backward_cursor(back)
    }

    /// Return a cursor at the first entry which compares equal to `entry`, or the end position
    /// if there is none.
    #[must_use]
    pub fn find(&self, entry: &T) -> Cursor {
        match self.skip_of(self.find_prev(entry), 0) {
            Some(index) if self.node_equals_entry(index, entry) => self.cursor_at(index),
            _ => Cursor::END,
        }
    }

    /// Check whether an entry which compares equal to `entry` is in the list.
    #[inline]
    #[must_use]
    pub fn contains(&self, entry: &T) -> bool {
        self.skip_of(self.find_prev(entry), 0)
            .is_some_and(|index| self.node_equals_entry(index, entry))
    }

    /// Return the half-open range `[first, last)` of the entries which compare equal to `entry`.
    ///
    /// If there are no such entries, `first == last`.
    #[must_use]
    pub fn equal_range(&self, entry: &T) -> (Cursor, Cursor) {
        let (first, last, _) = self.equal_links(entry);
        (self.forward_cursor(first), self.forward_cursor(last))
    }

    /// Iterate over the entries which compare equal to `entry`.
    #[must_use]
    pub fn equal_range_iter(&self, entry: &T) -> Iter<'_, T> {
        let (first, last, len) = self.equal_links(entry);
        Iter::new(&self.arena, first, last, self.last, len)
    }

    /// The number of entries which compare equal to `entry`.
    #[must_use]
    pub fn count(&self, entry: &T) -> usize {
        self.equal_links(entry).2
    }
}

impl<T, Cmp: Default> Default for MultisetSkiplist<T, Cmp> {
    #[inline]
    fn default() -> Self {
        Self::new(Cmp::default())
    }
}

/// The clone has the same entries at the same positions, so cursors into `self` address the same
/// entries in the clone. Its PRNG is reseeded from `self`'s, so the two lists do not go on to draw
/// identical node heights.
impl<T: Clone, Cmp: Clone> Clone for MultisetSkiplist<T, Cmp> {
    fn clone(&self) -> Self {
        let (state, increment) = self.prng.state();

        Self {
            cmp:            self.cmp.clone(),
            arena:          self.arena.clone(),
            head:           self.head,
            last:           self.last,
            current_height: self.current_height,
            len:            self.len,
            prng:           Rand32::new(state ^ increment.rotate_left(32)),
        }
    }
}

impl<T: Debug, Cmp> Debug for MultisetSkiplist<T, Cmp> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, Cmp: Comparator<T>> Extend<T> for MultisetSkiplist<T, Cmp> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl<T, Cmp: Comparator<T> + Default> FromIterator<T> for MultisetSkiplist<T, Cmp> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::default();
        list.extend(iter);
        list
    }
}

impl<T, Cmp> IntoIterator for MultisetSkiplist<T, Cmp> {
    type Item     = T;
    type IntoIter = IntoIter<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let first = self.head_skip(0);
        IntoIter::new(self.arena, first, self.last, self.len)
    }
}

impl<'a, T, Cmp> IntoIterator for &'a MultisetSkiplist<T, Cmp> {
    type Item     = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
