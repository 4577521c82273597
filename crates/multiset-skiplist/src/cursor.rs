use crate::arena::NodeKey;


/// A position in a [`MultisetSkiplist`], analogous to a C++-style iterator.
///
/// A cursor does not borrow the skiplist it came from; it is stepped and dereferenced through the
/// list (see [`MultisetSkiplist::next`], [`MultisetSkiplist::prev`], and
/// [`MultisetSkiplist::get`]). This allows a cursor to be held across mutations, such as
/// passing it to [`MultisetSkiplist::erase_at`].
///
/// There are three kinds of positions:
/// - the position before the first entry (the head of the list),
/// - the position of an entry,
/// - the end position, after the last entry.
///
/// Two cursors are equal if and only if they refer to the same position; in particular, cursors at
/// two different entries are unequal even if the entries compare equal.
///
/// A cursor at an entry becomes stale once that entry is erased (and only then). Stale cursors
/// are detected: they have no entry, and stepping one in either direction yields the end position.
/// Using a cursor with a skiplist other than the one it came from (or a clone of that skiplist)
/// gives unspecified, but memory-safe, results.
///
/// [`MultisetSkiplist`]: crate::MultisetSkiplist
/// [`MultisetSkiplist::next`]: crate::MultisetSkiplist::next
/// [`MultisetSkiplist::prev`]: crate::MultisetSkiplist::prev
/// [`MultisetSkiplist::get`]: crate::MultisetSkiplist::get
/// [`MultisetSkiplist::erase_at`]: crate::MultisetSkiplist::erase_at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor(pub(crate) Position);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Position {
    BeforeFirst,
    At(NodeKey),
    End,
}

impl Cursor {
    pub(crate) const BEFORE_FIRST: Self = Self(Position::BeforeFirst);
    pub(crate) const END: Self = Self(Position::End);

    /// Whether the cursor is at the end position, after the last entry.
    ///
    /// Stale cursors are treated as the end position by a skiplist, but are not reported as such
    /// here; see [`MultisetSkiplist::is_end`].
    ///
    /// [`MultisetSkiplist::is_end`]: crate::MultisetSkiplist::is_end
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self.0, Position::End)
    }

    /// Whether the cursor is at the position before the first entry.
    #[inline]
    #[must_use]
    pub const fn is_before_first(self) -> bool {
        matches!(self.0, Position::BeforeFirst)
    }
}
