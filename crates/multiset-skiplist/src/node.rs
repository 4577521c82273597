use crate::{arena::NodeIndex, node_heights::MAX_HEIGHT};


/// A reference to a node, or to one of the two sentinels.
///
/// As a forward link, `None` refers to the tail sentinel (the end of a level). As a backward link,
/// or as a predecessor found by a search, `None` refers to the head sentinel.
pub(crate) type Link = Option<NodeIndex>;


/// A node of a skiplist, owning its entry and its links to other nodes.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    entry: T,
    /// Forward links, one per level the node participates in. The length is the node's height,
    /// which never changes after construction.
    skips: Box<[Link]>,
    /// The backward link on the lowest level.
    back:  Link,
}

#[expect(unreachable_pub, reason = "control Node's visibility from one site, its definition")]
impl<T> Node<T> {
    /// Create an unlinked node with the given height.
    #[must_use]
    pub fn new(entry: T, height: usize, back: Link) -> Self {
        debug_assert!(
            (1..=MAX_HEIGHT).contains(&height),
            "this crate should never attempt to create a node with an invalid height",
        );

        Self {
            entry,
            skips: vec![None; height].into_boxed_slice(),
            back,
        }
    }

    #[inline]
    #[must_use]
    pub const fn entry(&self) -> &T {
        &self.entry
    }

    #[inline]
    #[must_use]
    pub fn into_entry(self) -> T {
        self.entry
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.skips.len()
    }

    /// Get the forward link at `level`.
    ///
    /// Levels at or above the node's height have no link, and `None` is returned.
    #[inline]
    #[must_use]
    pub fn skip(&self, level: usize) -> Link {
        self.skips.get(level).copied().flatten()
    }

    /// # Panics
    /// Panics if `level >= self.height()`.
    #[inline]
    pub fn set_skip(&mut self, level: usize, link: Link) {
        #[expect(clippy::indexing_slicing, reason = "callers only splice below the node height")]
        #[expect(clippy::semicolon_outside_block, reason = "block needed for lint scope")]
        {
            self.skips[level] = link;
        }
    }

    #[inline]
    #[must_use]
    pub const fn back(&self) -> Link {
        self.back
    }

    #[inline]
    pub const fn set_back(&mut self, link: Link) {
        self.back = link;
    }
}
