//! Linked Container - a doubly linked list of items with stable
//! insertion ids.
//!
//! Nodes live in an [`Arena`] and link by index. Insertion ids are kept in
//! a separate `Vec` aligned with traversal order: `order[i]` is the id of
//! the element at position `i`.
//!
//! # Sort policy
//!
//! [`LinkedContainer::sort_by`] never relinks nodes. It computes the sorted
//! order, then writes the payloads back into the existing nodes in list
//! order. Node `k` of the list therefore keeps its arena slot across a sort
//! but may hold a different element afterwards; the id always travels with
//! its element.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::error::{check_index, Error, Result};
use crate::item::{validate, InsertionId, Item};

pub struct LinkedContainer<T> {
    arena: Arena<T>,
    /// First node in list order
    head: ArenaIndex,
    /// Last node in list order
    tail: ArenaIndex,
    /// Insertion id per position, aligned with traversal order
    order: Vec<InsertionId>,
    next_id: InsertionId,
}

impl<T> LinkedContainer<T> {
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            head: NULL_INDEX,
            tail: NULL_INDEX,
            order: Vec::new(),
            next_id: 0,
        }
    }

    /// Pre-size the node pool and id list for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            head: NULL_INDEX,
            tail: NULL_INDEX,
            order: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Number of live elements
    #[inline]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insertion id of each live element, in positional order
    #[inline]
    pub fn insertion_order(&self) -> &[InsertionId] {
        &self.order
    }

    /// Id the next added element will receive
    #[inline]
    pub fn next_insertion_id(&self) -> InsertionId {
        self.next_id
    }

    pub fn first(&self) -> Option<&T> {
        (self.head != NULL_INDEX).then(|| self.arena.item(self.head))
    }

    pub fn last(&self) -> Option<&T> {
        (self.tail != NULL_INDEX).then(|| self.arena.item(self.tail))
    }

    /// Element at `position`, walking from whichever end is closer.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.node_at(position).map(|index| self.arena.item(index))
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        let index = self.node_at(position)?;
        Some(self.arena.item_mut(index))
    }

    /// Front-to-back iterator over live elements
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            front: self.head,
            back: self.tail,
            len: self.count(),
        }
    }

    /// `(insertion id, element)` pairs in positional order
    pub fn entries(&self) -> impl Iterator<Item = (InsertionId, &T)> + '_ {
        self.order.iter().copied().zip(self.iter())
    }

    /// Current position of the element stamped with `id`.
    pub fn position_of(&self, id: InsertionId) -> Option<usize> {
        self.order.iter().position(|&probe| probe == id)
    }

    /// Element stamped with `id`, or `None` if it was never issued or has
    /// since been removed.
    pub fn get_by_insertion_id(&self, id: InsertionId) -> Option<&T> {
        self.entries()
            .find(|&(probe, _)| probe == id)
            .map(|(_, item)| item)
    }

    pub fn get_mut_by_insertion_id(&mut self, id: InsertionId) -> Option<&mut T> {
        let position = self.position_of(id)?;
        self.get_mut(position)
    }

    /// Remove the element at `position`, returning it.
    ///
    /// # Complexity
    /// O(n) walk to the node, O(1) unlink, O(n) id removal
    pub fn remove_at(&mut self, position: usize) -> Result<T> {
        check_index(position, self.count())?;
        let index = match self.node_at(position) {
            Some(index) => index,
            None => return Err(Error::invalid_index(position, self.count())),
        };

        self.unlink(index);
        self.order.remove(position);
        Ok(self.arena.free(index))
    }

    /// Remove the element stamped with `id`.
    pub fn remove_by_insertion_id(&mut self, id: InsertionId) -> Result<T> {
        match self.position_of(id) {
            Some(position) => self.remove_at(position),
            None => Err(Error::unknown_id(id)),
        }
    }

    /// Drop every element. The id counter keeps counting, so ids issued
    /// after a clear never collide with ids issued before it.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = NULL_INDEX;
        self.tail = NULL_INDEX;
        self.order.clear();
    }

    /// Binary-insertion sort.
    ///
    /// Each element, taken in list order, is placed into the growing sorted
    /// prefix at the upper bound found by binary search (O(log k)
    /// comparisons, O(k) shift), so equal elements keep their relative
    /// order. Payloads and ids are then written back into the existing
    /// nodes, see the module docs for the aliasing consequence.
    ///
    /// A panicking comparator leaves the container untouched: nothing moves
    /// until every comparison has been made.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.count() < 2 {
            return;
        }

        let slots: Vec<ArenaIndex> = self.node_indices().collect();
        let mut sorted: Vec<(ArenaIndex, InsertionId)> = Vec::with_capacity(slots.len());

        for (&index, &id) in slots.iter().zip(&self.order) {
            let item = self.arena.item(index);
            let at = sorted.partition_point(|&(probe, _)| {
                compare(self.arena.item(probe), item) != Ordering::Greater
            });
            sorted.insert(at, (index, id));
        }

        let payloads: Vec<T> = sorted.iter().map(|&(index, _)| self.arena.take(index)).collect();
        for (position, (item, &slot)) in payloads.into_iter().zip(&slots).enumerate() {
            self.arena.put(slot, item);
            self.order[position] = sorted[position].1;
        }
    }

    /// Link a node at the tail of the list.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    fn link_back(&mut self, index: ArenaIndex) {
        if self.tail == NULL_INDEX {
            // Empty list: new node becomes both head and tail
            debug_assert!(self.head == NULL_INDEX);
            self.head = index;
            self.tail = index;
        } else {
            self.arena.get_mut(self.tail).next = index;
            self.arena.get_mut(index).prev = self.tail;
            self.tail = index;
        }
    }

    /// Link a node at the head of the list.
    #[inline]
    fn link_front(&mut self, index: ArenaIndex) {
        if self.head == NULL_INDEX {
            debug_assert!(self.tail == NULL_INDEX);
            self.head = index;
            self.tail = index;
        } else {
            self.arena.get_mut(self.head).prev = index;
            self.arena.get_mut(index).next = self.head;
            self.head = index;
        }
    }

    /// Unlink a node from anywhere in the list.
    ///
    /// Handles all edge cases:
    /// - Only node (head == tail)
    /// - Removing head
    /// - Removing tail
    /// - Removing from middle
    #[inline]
    fn unlink(&mut self, index: ArenaIndex) {
        let node = self.arena.get(index);
        let prev_idx = node.prev;
        let next_idx = node.next;

        if prev_idx == NULL_INDEX {
            debug_assert!(self.head == index);
            self.head = next_idx;
        } else {
            self.arena.get_mut(prev_idx).next = next_idx;
        }

        if next_idx == NULL_INDEX {
            debug_assert!(self.tail == index);
            self.tail = prev_idx;
        } else {
            self.arena.get_mut(next_idx).prev = prev_idx;
        }

        let node = self.arena.get_mut(index);
        node.prev = NULL_INDEX;
        node.next = NULL_INDEX;
    }

    /// Arena index of the node at `position`.
    fn node_at(&self, position: usize) -> Option<ArenaIndex> {
        let len = self.count();
        if position >= len {
            return None;
        }

        let mut cursor;
        if position < len / 2 {
            cursor = self.head;
            for _ in 0..position {
                cursor = self.arena.get(cursor).next;
            }
        } else {
            cursor = self.tail;
            for _ in position + 1..len {
                cursor = self.arena.get(cursor).prev;
            }
        }
        Some(cursor)
    }

    fn node_indices(&self) -> impl Iterator<Item = ArenaIndex> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NULL_INDEX {
                return None;
            }
            let index = cursor;
            cursor = self.arena.get(index).next;
            Some(index)
        })
    }

    /// Issue the next insertion id.
    fn stamp(&mut self) -> InsertionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Link at the tail and stamp without validating; the caller has
    /// checked the item.
    pub(crate) fn push_unchecked(&mut self, item: T) -> InsertionId {
        let index = self.arena.alloc(item);
        self.link_back(index);
        let id = self.stamp();
        self.order.push(id);
        id
    }
}

impl<T: Item> LinkedContainer<T> {
    /// Add at the head of the list.
    ///
    /// # Errors
    /// `InvalidArgument` for a negative price; nothing is stamped then.
    pub fn add_first(&mut self, item: T) -> Result<InsertionId> {
        validate(&item)?;
        let index = self.arena.alloc(item);
        self.link_front(index);
        let id = self.stamp();
        self.order.insert(0, id);
        Ok(id)
    }

    /// Add at the tail of the list.
    pub fn add_last(&mut self, item: T) -> Result<InsertionId> {
        validate(&item)?;
        Ok(self.push_unchecked(item))
    }

    /// Same as [`LinkedContainer::add_last`].
    #[inline]
    pub fn add(&mut self, item: T) -> Result<InsertionId> {
        self.add_last(item)
    }

    /// All elements named exactly `name`, in positional order.
    pub fn get_by_attribute(&self, name: &str) -> Vec<&T> {
        self.iter().filter(|item| item.name() == name).collect()
    }

    /// Sum of prices over live elements.
    pub fn total_price(&self) -> Decimal {
        self.iter().map(Item::price).sum()
    }

    /// Sort by [`Item::compare`].
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.compare(b));
    }

    /// Move every element into an array container, in positional order.
    ///
    /// Ids are re-stamped from zero, the same as a reload from disk.
    pub fn into_array(mut self) -> crate::array::ArrayContainer<T> {
        let mut array = crate::array::ArrayContainer::with_capacity(self.count());
        while self.head != NULL_INDEX {
            let index = self.head;
            self.unlink(index);
            array.push_unchecked(self.arena.free(index));
        }
        array
    }
}

impl<T> Default for LinkedContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LinkedContainer<T> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            head: self.head,
            tail: self.tail,
            order: self.order.clone(),
            next_id: self.next_id,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedContainer")
            .field("items", &self.iter().collect::<Vec<_>>())
            .field("order", &self.order)
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Borrowing iterator over a [`LinkedContainer`].
pub struct Iter<'a, T> {
    arena: &'a Arena<T>,
    front: ArenaIndex,
    back: ArenaIndex,
    len: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let index = self.front;
        self.front = self.arena.get(index).next;
        self.len -= 1;
        Some(self.arena.item(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let index = self.back;
        self.back = self.arena.get(index).prev;
        self.len -= 1;
        Some(self.arena.item(index))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a LinkedContainer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::testing::{tag, Tag};

    fn names(list: &LinkedContainer<Tag>) -> Vec<&'static str> {
        list.iter().map(|t| t.name).collect()
    }

    fn setup(prices: &[(&'static str, i64)]) -> LinkedContainer<Tag> {
        let mut list = LinkedContainer::new();
        for &(name, price) in prices {
            list.add_last(tag(name, price)).unwrap();
        }
        list
    }

    #[test]
    fn test_empty_list() {
        let list: LinkedContainer<Tag> = LinkedContainer::new();
        assert!(list.is_empty());
        assert_eq!(list.count(), 0);
        assert_eq!(list.next_insertion_id(), 0);
        assert!(list.first().is_none());
        assert!(list.last().is_none());
        assert!(list.get(0).is_none());
        assert_eq!(list.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_add_first_and_last() {
        let mut list = LinkedContainer::new();
        assert_eq!(list.add_last(tag("b", 2)).unwrap(), 0);
        assert_eq!(list.add_first(tag("a", 1)).unwrap(), 1);
        assert_eq!(list.add_last(tag("c", 3)).unwrap(), 2);

        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert_eq!(list.insertion_order(), &[1, 0, 2]);
        assert_eq!(list.first().unwrap().name, "a");
        assert_eq!(list.last().unwrap().name, "c");
    }

    #[test]
    fn test_reverse_iteration() {
        let list = setup(&[("a", 1), ("b", 2), ("c", 3)]);
        let back: Vec<_> = list.iter().rev().map(|t| t.name).collect();
        assert_eq!(back, vec!["c", "b", "a"]);

        let mut iter = list.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().unwrap().name, "a");
        assert_eq!(iter.next_back().unwrap().name, "c");
        assert_eq!(iter.next().unwrap().name, "b");
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn test_get_walks_from_both_ends() {
        let list = setup(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]);
        for (position, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert_eq!(list.get(position).unwrap().name, *name);
        }
        assert!(list.get(5).is_none());
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut list = setup(&[("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

        assert_eq!(list.remove_at(0).unwrap().name, "a");
        assert_eq!(names(&list), vec!["b", "c", "d"]);
        assert_eq!(list.insertion_order(), &[1, 2, 3]);

        assert_eq!(list.remove_at(1).unwrap().name, "c");
        assert_eq!(names(&list), vec!["b", "d"]);
        assert_eq!(list.insertion_order(), &[1, 3]);

        assert_eq!(list.remove_at(1).unwrap().name, "d");
        assert_eq!(list.last().unwrap().name, "b");

        assert_eq!(list.remove_at(0).unwrap().name, "b");
        assert!(list.is_empty());
        assert!(list.first().is_none());
    }

    #[test]
    fn test_remove_out_of_range_leaves_list_intact() {
        let mut list = setup(&[("a", 1), ("b", 2)]);
        assert!(matches!(
            list.remove_at(2),
            Err(Error::InvalidIndex { index: 2, len: 2 })
        ));
        assert_eq!(names(&list), vec!["a", "b"]);
        assert_eq!(list.insertion_order(), &[0, 1]);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut list = LinkedContainer::new();
        assert_eq!(list.add(tag("first", 1)).unwrap(), 0);
        list.remove_at(0).unwrap();
        assert_eq!(list.add(tag("second", 1)).unwrap(), 1);
        assert!(list.get_by_insertion_id(0).is_none());
        assert_eq!(list.get_by_insertion_id(1).unwrap().name, "second");
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut list = setup(&[("a", 1)]);
        assert!(matches!(
            list.add_first(tag("bad", -5)),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(list.count(), 1);
        assert_eq!(list.next_insertion_id(), 1);
    }

    #[test]
    fn test_get_by_attribute() {
        let list = setup(&[("tea", 3), ("milk", 2), ("tea", 5)]);
        let teas = list.get_by_attribute("tea");
        assert_eq!(teas.len(), 2);
        assert_eq!(teas[0].price, Decimal::from(3));
        assert_eq!(teas[1].price, Decimal::from(5));
        assert!(list.get_by_attribute("coffee").is_empty());
        // Exact match only
        assert!(list.get_by_attribute("te").is_empty());
    }

    #[test]
    fn test_sort_keeps_ids_with_elements() {
        let mut list = setup(&[("c", 30), ("a", 10), ("d", 40), ("b", 20)]);
        let before: Vec<_> = (0..4)
            .map(|id| list.get_by_insertion_id(id).unwrap().clone())
            .collect();

        list.sort();

        assert_eq!(names(&list), vec!["a", "b", "c", "d"]);
        assert_eq!(list.insertion_order(), &[1, 3, 0, 2]);
        for (id, expected) in before.iter().enumerate() {
            assert_eq!(list.get_by_insertion_id(id as u64), Some(expected));
        }
    }

    #[test]
    fn test_sort_is_stable() {
        let mut list = setup(&[("x", 2), ("y", 1), ("z", 2), ("w", 1)]);
        list.sort_by(|a, b| a.price.cmp(&b.price));
        assert_eq!(names(&list), vec!["y", "w", "x", "z"]);
        assert_eq!(list.insertion_order(), &[1, 3, 0, 2]);
    }

    #[test]
    fn test_sort_reuses_nodes() {
        let mut list = setup(&[("b", 2), ("a", 1)]);
        let head_before = list.head;
        list.sort();
        // Same node, new payload
        assert_eq!(list.head, head_before);
        assert_eq!(list.arena.item(list.head).name, "a");
        assert_eq!(list.arena.slots(), 2);
    }

    #[test]
    fn test_sort_after_add_first_and_removal() {
        let mut list = setup(&[("m", 5), ("k", 3)]);
        list.add_first(tag("z", 9)).unwrap();
        list.add_first(tag("a", 1)).unwrap();
        list.remove_at(2).unwrap(); // "m"
        list.sort_by(|a, b| b.price.cmp(&a.price));

        assert_eq!(names(&list), vec!["z", "k", "a"]);
        assert_eq!(list.insertion_order(), &[2, 1, 3]);
    }

    #[test]
    fn test_clear_keeps_counter() {
        let mut list = setup(&[("a", 1), ("b", 2)]);
        list.clear();
        assert!(list.is_empty());
        assert!(list.insertion_order().is_empty());
        assert_eq!(list.add(tag("c", 3)).unwrap(), 2);
        assert_eq!(names(&list), vec!["c"]);
    }

    #[test]
    fn test_remove_by_insertion_id() {
        let mut list = setup(&[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(list.remove_by_insertion_id(1).unwrap().name, "b");
        assert_eq!(list.position_of(2), Some(1));
        assert!(matches!(
            list.remove_by_insertion_id(1),
            Err(Error::UnknownId { id: 1 })
        ));
    }

    #[test]
    fn test_get_mut_by_insertion_id() {
        let mut list = setup(&[("a", 1), ("b", 2)]);
        list.get_mut_by_insertion_id(1).unwrap().price = Decimal::from(7);
        assert_eq!(list.total_price(), Decimal::from(8));
    }

    #[test]
    fn test_into_array_restamps() {
        let mut list = setup(&[("a", 1), ("b", 2), ("c", 3)]);
        list.remove_at(0).unwrap();
        let array = list.into_array();
        assert_eq!(array.count(), 2);
        assert_eq!(array.insertion_order(), &[0, 1]);
        assert_eq!(array.get(0).unwrap().name, "b");
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = setup(&[("a", 1), ("b", 2)]);
        list.remove_at(0).unwrap();
        list.add_last(tag("c", 3)).unwrap();
        assert_eq!(list.arena.slots(), 2);
        assert_eq!(names(&list), vec!["b", "c"]);
    }
}
