//! Array Container - a growable array of items with stable insertion ids.
//!
//! Elements and their insertion ids live in two parallel buffers that grow
//! in lockstep. Capacity starts at one slot and doubles whenever an add
//! finds the buffers full, which keeps `add` amortized O(1).

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::error::{check_index, Error, Result};
use crate::item::{validate, InsertionId, Item};

/// Capacity of a freshly created container
const INITIAL_CAPACITY: usize = 1;

#[derive(Clone)]
pub struct ArrayContainer<T> {
    items: Vec<T>,
    /// `order[i]` is the insertion id of `items[i]`
    order: Vec<InsertionId>,
    /// Tracked capacity of both buffers
    capacity: usize,
    next_id: InsertionId,
}

impl<T> ArrayContainer<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Start with room for `capacity` elements (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(INITIAL_CAPACITY);
        Self {
            items: Vec::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Number of live elements
    #[inline]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slots available before the next doubling
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
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

    #[inline]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    #[inline]
    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        self.items.get_mut(position)
    }

    /// Live elements in positional order
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// `(insertion id, element)` pairs in positional order
    pub fn entries(&self) -> impl Iterator<Item = (InsertionId, &T)> + '_ {
        self.order.iter().copied().zip(self.items.iter())
    }

    /// Current position of the element stamped with `id`.
    pub fn position_of(&self, id: InsertionId) -> Option<usize> {
        self.order.iter().position(|&probe| probe == id)
    }

    /// Element stamped with `id`, or `None` if it was never issued or has
    /// since been removed.
    ///
    /// # Complexity
    /// O(n) scan of the id buffer
    pub fn get_by_insertion_id(&self, id: InsertionId) -> Option<&T> {
        self.position_of(id).map(|position| &self.items[position])
    }

    pub fn get_mut_by_insertion_id(&mut self, id: InsertionId) -> Option<&mut T> {
        let position = self.position_of(id)?;
        Some(&mut self.items[position])
    }

    /// Remove the element at `position`, shifting later elements and
    /// their ids down by one.
    ///
    /// # Complexity
    /// O(n)
    pub fn remove_at(&mut self, position: usize) -> Result<T> {
        check_index(position, self.count())?;
        self.order.remove(position);
        Ok(self.items.remove(position))
    }

    /// Remove the element stamped with `id`.
    pub fn remove_by_insertion_id(&mut self, id: InsertionId) -> Result<T> {
        match self.position_of(id) {
            Some(position) => self.remove_at(position),
            None => Err(Error::unknown_id(id)),
        }
    }

    /// Drop every element. Capacity is kept and the id counter keeps
    /// counting, so ids are never reused.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Pairwise exchange sort.
    ///
    /// For every position `i`, each later element that compares less than
    /// the one at `i` is swapped into it, together with its id. O(n²)
    /// comparisons; equal elements may change relative order.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let len = self.items.len();
        for i in 0..len {
            for j in i + 1..len {
                if compare(&self.items[i], &self.items[j]) == Ordering::Greater {
                    self.items.swap(i, j);
                    self.order.swap(i, j);
                }
            }
        }
    }

    /// Double both buffers when they are full.
    fn grow_if_full(&mut self) {
        if self.items.len() < self.capacity {
            return;
        }
        let new_capacity = self.capacity * 2;
        let additional = new_capacity - self.items.len();
        self.items.reserve_exact(additional);
        self.order.reserve_exact(additional);
        self.capacity = new_capacity;
    }

    pub(crate) fn push_unchecked(&mut self, item: T) -> InsertionId {
        self.grow_if_full();
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(item);
        self.order.push(id);
        id
    }
}

impl<T: Item> ArrayContainer<T> {
    /// Append `item` and stamp it with the next insertion id.
    ///
    /// # Errors
    /// `InvalidArgument` for a negative price; nothing is stamped then.
    ///
    /// # Complexity
    /// Amortized O(1)
    pub fn add(&mut self, item: T) -> Result<InsertionId> {
        validate(&item)?;
        Ok(self.push_unchecked(item))
    }

    /// All elements named exactly `name`, in positional order.
    pub fn get_by_attribute(&self, name: &str) -> Vec<&T> {
        self.items.iter().filter(|item| item.name() == name).collect()
    }

    /// Sum of prices over live elements.
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(Item::price).sum()
    }

    /// Sort by [`Item::compare`].
    pub fn sort(&mut self) {
        self.sort_by(|a, b| a.compare(b));
    }

    /// Move every element into a linked container, in positional order.
    ///
    /// Ids are re-stamped from zero, the same as a reload from disk.
    pub fn into_linked(self) -> crate::linked::LinkedContainer<T> {
        let mut list = crate::linked::LinkedContainer::with_capacity(self.count());
        for item in self.items {
            list.push_unchecked(item);
        }
        list
    }
}

impl<T> Default for ArrayContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayContainer")
            .field("items", &self.items)
            .field("order", &self.order)
            .field("capacity", &self.capacity)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a ArrayContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
