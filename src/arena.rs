//! Arena - slab of list nodes addressed by 32-bit indices.
//!
//! Nodes live in one contiguous `Vec` and link to each other by index,
//! so the linked container needs no per-node heap allocation and no
//! `unsafe` pointer juggling. Freed slots are threaded into a free list
//! through their `next` field and reused before the slab grows.

use std::fmt;

/// Sentinel value representing a null/invalid index (like nullptr)
pub const NULL_INDEX: u32 = u32::MAX;

/// Type alias for arena indices - our "compressed pointers"
pub type ArenaIndex = u32;

/// One list node: payload plus its neighbours.
///
/// `item` is `None` only while the node sits on the free list.
#[derive(Clone)]
pub struct Node<T> {
    pub item: Option<T>,
    /// Index of the next node in list order
    pub next: ArenaIndex,
    /// Index of the previous node (enables O(1) unlink)
    pub prev: ArenaIndex,
}

impl<T> Node<T> {
    #[inline]
    const fn vacant(next: ArenaIndex) -> Self {
        Self {
            item: None,
            next,
            prev: NULL_INDEX,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("item", &self.item)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

/// Growable node pool with O(1) allocation and deallocation.
pub struct Arena<T> {
    /// Contiguous block of nodes, live and free
    nodes: Vec<Node<T>>,

    /// Head of the free list (index of first available node)
    free_head: ArenaIndex,

    /// Number of currently allocated nodes
    allocated_count: u32,
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_head: NULL_INDEX,
            allocated_count: 0,
        }
    }

    /// Create an arena with room for `capacity` nodes before it grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_head: NULL_INDEX,
            allocated_count: 0,
        }
    }

    /// Store `item` in a fresh unlinked node and return its index.
    ///
    /// Pops the free list when possible, otherwise appends.
    ///
    /// # Panics
    /// Panics if the arena would need more than `u32::MAX - 1` nodes
    /// (we reserve MAX for NULL_INDEX).
    #[inline]
    pub fn alloc(&mut self, item: T) -> ArenaIndex {
        let index = if self.free_head != NULL_INDEX {
            let index = self.free_head;
            self.free_head = self.nodes[index as usize].next;
            index
        } else {
            assert!(
                self.nodes.len() < NULL_INDEX as usize,
                "arena exhausted the u32 index space"
            );
            self.nodes.push(Node::vacant(NULL_INDEX));
            (self.nodes.len() - 1) as ArenaIndex
        };

        let node = &mut self.nodes[index as usize];
        node.item = Some(item);
        node.next = NULL_INDEX;
        node.prev = NULL_INDEX;
        self.allocated_count += 1;
        index
    }

    /// Return a node to the free list and hand back its payload.
    ///
    /// The caller must have unlinked the node first.
    ///
    /// # Panics
    /// Panics on a double free.
    #[inline]
    pub fn free(&mut self, index: ArenaIndex) -> T {
        debug_assert!((index as usize) < self.nodes.len(), "Index out of bounds");

        let item = self.take(index);
        self.nodes[index as usize] = Node::vacant(self.free_head);
        self.free_head = index;
        self.allocated_count -= 1;
        item
    }

    /// Drop every node, live or free, keeping the allocation.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_head = NULL_INDEX;
        self.allocated_count = 0;
    }

    /// Payload of a live node.
    ///
    /// # Panics
    /// Panics if the slot is on the free list.
    #[inline]
    pub fn item(&self, index: ArenaIndex) -> &T {
        match &self.nodes[index as usize].item {
            Some(item) => item,
            None => panic!("arena slot {} is vacant", index),
        }
    }

    #[inline]
    pub fn item_mut(&mut self, index: ArenaIndex) -> &mut T {
        match &mut self.nodes[index as usize].item {
            Some(item) => item,
            None => panic!("arena slot {} is vacant", index),
        }
    }

    /// Move the payload out, leaving the node linked but empty.
    ///
    /// The caller must refill it with [`Arena::put`] before anything else
    /// reads the node.
    #[inline]
    pub(crate) fn take(&mut self, index: ArenaIndex) -> T {
        match self.nodes[index as usize].item.take() {
            Some(item) => item,
            None => panic!("arena slot {} is vacant", index),
        }
    }

    /// Store a payload into a linked node emptied by [`Arena::take`].
    #[inline]
    pub(crate) fn put(&mut self, index: ArenaIndex, item: T) {
        let slot = &mut self.nodes[index as usize].item;
        debug_assert!(slot.is_none(), "overwriting a live payload");
        *slot = Some(item);
    }

    #[inline]
    pub fn get(&self, index: ArenaIndex) -> &Node<T> {
        &self.nodes[index as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, index: ArenaIndex) -> &mut Node<T> {
        &mut self.nodes[index as usize]
    }

    /// Returns the number of currently allocated nodes.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated_count
    }

    /// Number of slots backing the arena (live plus free).
    #[inline]
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated_count == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Arena<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            free_head: self.free_head,
            allocated_count: self.allocated_count,
        }
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("slots", &self.nodes.len())
            .field("allocated", &self.allocated_count)
            .field("free_head", &self.free_head)
            .finish()
    }
}
