use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

use slab::Slab;
use thiserror::Error;

use crate::node::Node;


/// The index of a slot in a [`NodeArena`].
///
/// An index stays valid until the node in its slot is freed; afterwards, the slot may be reused
/// by a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(u32);

impl NodeIndex {
    #[inline]
    #[must_use]
    const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// A [`NodeIndex`] along with the generation of its slot at the time the key was made.
///
/// Keys of freed nodes never compare equal to keys of nodes which later reuse the slot
/// (unless a single slot is reused `2^32` times, as the generation counter wraps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey {
    index:      NodeIndex,
    generation: u32,
}

/// An error from [`MultisetSkiplist::try_reserve`].
///
/// [`MultisetSkiplist::try_reserve`]: crate::MultisetSkiplist::try_reserve
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    /// More nodes were requested than a skiplist can address.
    #[error("cannot reserve space for more than {} skiplist nodes", u32::MAX)]
    CapacityOverflow,
    /// The allocator could not provide the requested memory.
    #[error("failed to allocate space for skiplist nodes: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Stable storage for the nodes of a skiplist.
///
/// Nodes live in a [`Slab`], which recycles vacant slots. Each slot additionally has a
/// generation, bumped whenever its node is freed, so that keys to freed nodes can be told apart
/// from keys to whichever node reuses the slot.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    nodes:       Slab<Node<T>>,
    /// One counter per slot the slab has ever handed out.
    generations: Vec<u32>,
}

impl<T> Default for NodeArena<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[expect(unreachable_pub, reason = "control visibility at type definition")]
impl<T> NodeArena<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes:       Slab::new(),
            generations: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes:       Slab::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
        }
    }

    /// The number of occupied slots.
    #[inline]
    #[must_use]
    pub fn live(&self) -> usize {
        self.nodes.len()
    }

    /// Ensure that the next `additional` calls to [`alloc`] do not need to grow the arena.
    ///
    /// Only growth of the generation table is fallible; growing the slab itself aborts on
    /// allocation failure, like [`Vec::reserve`].
    ///
    /// [`alloc`]: NodeArena::alloc
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        let max_slots = usize::try_from(u32::MAX).unwrap_or(usize::MAX);

        let total = self.nodes.len()
            .checked_add(additional)
            .ok_or(ReserveError::CapacityOverflow)?;
        if total > max_slots {
            return Err(ReserveError::CapacityOverflow);
        }

        // Every vacant slot the slab has already handed out has a generation.
        let vacant = self.generations.len() - self.nodes.len();
        self.generations.try_reserve(additional.saturating_sub(vacant))?;
        self.nodes.reserve(additional);
        Ok(())
    }

    /// Store `node` in a vacant slot, and return its index.
    ///
    /// # Panics
    /// Panics if every one of the `u32::MAX` addressable slots is occupied.
    #[expect(clippy::panic, reason = "mirror the behavior of `Vec::push` on overflow")]
    pub fn alloc(&mut self, node: Node<T>) -> NodeIndex {
        let slot = self.nodes.vacant_key();
        let Some(raw) = u32::try_from(slot).ok().filter(|&raw| raw < u32::MAX) else {
            panic!("a skiplist cannot hold more than {} nodes", u32::MAX);
        };

        let inserted = self.nodes.insert(node);
        debug_assert_eq!(inserted, slot, "slab should fill its vacant key");

        if slot == self.generations.len() {
            self.generations.push(0);
        }
        NodeIndex(raw)
    }

    /// Remove the node at `index` from the arena, returning it.
    ///
    /// Returns `None` if the slot is already vacant.
    pub fn free(&mut self, index: NodeIndex) -> Option<Node<T>> {
        let node = self.nodes.try_remove(index.slot())?;

        if let Some(generation) = self.generations.get_mut(index.slot()) {
            *generation = generation.wrapping_add(1);
        }
        Some(node)
    }

    /// Get a key which identifies the node currently at `index`, if the slot is occupied.
    #[must_use]
    pub fn key(&self, index: NodeIndex) -> Option<NodeKey> {
        if !self.nodes.contains(index.slot()) {
            return None;
        }

        let generation = *self.generations.get(index.slot())?;
        Some(NodeKey { index, generation })
    }

    /// Get the index of the node identified by `key`, if that node has not been freed.
    #[must_use]
    pub fn resolve(&self, key: NodeKey) -> Option<NodeIndex> {
        self.key(key.index)
            .filter(|current| *current == key)
            .map(|_| key.index)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node<T>> {
        self.nodes.get(index.slot())
    }
}

/// Links stored in a skiplist always refer to occupied slots, so indexing a vacant slot (which
/// panics) indicates a bug in this crate.
impl<T> Index<NodeIndex> for NodeArena<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.slot()]
    }
}

impl<T> IndexMut<NodeIndex> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.slot()]
    }
}
