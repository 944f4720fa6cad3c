//! Query layer - read-only views shared by both containers.
//!
//! Views hold shared borrows of the container they were built from, so
//! the container cannot be mutated while a view is alive. The four
//! ordered views collect their references eagerly at call time;
//! [`Query::find_all`] filters lazily.
//!
//! Substring matching is case-sensitive (`str::contains`).

use std::iter::FusedIterator;

use crate::array::ArrayContainer;
use crate::item::Item;
use crate::linked::{self, LinkedContainer};

/// Read-only access over a container's live elements.
pub trait Query {
    type Element: Item;

    /// Borrowing front-to-back iterator
    type Iter<'a>: DoubleEndedIterator<Item = &'a Self::Element>
    where
        Self: 'a;

    /// Live elements in positional order
    fn items(&self) -> Self::Iter<'_>;

    /// Live elements, last position first
    fn reversed(&self) -> View<'_, Self::Element> {
        View::new(self.items().rev().collect())
    }

    /// Elements whose name contains `needle` (case-sensitive).
    fn containing(&self, needle: &str) -> View<'_, Self::Element> {
        View::new(self.items().filter(|item| item.name().contains(needle)).collect())
    }

    /// Elements by ascending price; ties keep positional order.
    fn sorted_by_price(&self) -> View<'_, Self::Element> {
        let mut refs: Vec<_> = self.items().collect();
        refs.sort_by(|a, b| a.price().cmp(&b.price()));
        View::new(refs)
    }

    /// Elements by name (byte-wise); ties keep positional order.
    fn sorted_by_name(&self) -> View<'_, Self::Element> {
        let mut refs: Vec<_> = self.items().collect();
        refs.sort_by(|a, b| a.name().cmp(b.name()));
        View::new(refs)
    }

    /// First element satisfying `predicate`.
    fn find<P>(&self, mut predicate: P) -> Option<&Self::Element>
    where
        P: FnMut(&Self::Element) -> bool,
    {
        self.items().find(|item| predicate(*item))
    }

    /// Every element satisfying `predicate`, evaluated lazily.
    fn find_all<P>(&self, predicate: P) -> FindAll<Self::Iter<'_>, P>
    where
        P: FnMut(&Self::Element) -> bool,
    {
        FindAll {
            inner: self.items(),
            predicate,
        }
    }
}

impl<T: Item> Query for ArrayContainer<T> {
    type Element = T;
    type Iter<'a> = std::slice::Iter<'a, T> where Self: 'a;

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: Item> Query for LinkedContainer<T> {
    type Element = T;
    type Iter<'a> = linked::Iter<'a, T> where Self: 'a;

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

/// Snapshot of element references taken when the view was built.
#[derive(Debug, Clone)]
pub struct View<'a, T> {
    inner: std::vec::IntoIter<&'a T>,
}

impl<'a, T> View<'a, T> {
    fn new(refs: Vec<&'a T>) -> Self {
        Self { inner: refs.into_iter() }
    }

    /// Elements not yet yielded
    pub fn as_slice(&self) -> &[&'a T] {
        self.inner.as_slice()
    }
}

impl<'a, T> Iterator for View<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for View<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for View<'_, T> {}

impl<T> FusedIterator for View<'_, T> {}

/// Lazy filter returned by [`Query::find_all`].
pub struct FindAll<I, P> {
    inner: I,
    predicate: P,
}

impl<'a, T, I, P> Iterator for FindAll<I, P>
where
    T: 'a,
    I: Iterator<Item = &'a T>,
    P: FnMut(&T) -> bool,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let predicate = &mut self.predicate;
        self.inner.find(|item| predicate(*item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
