//! Ordered Eviction Index
//!
//! An arena of slots addressed by integer [`Handle`]s, kept in eviction order by
//! an intrusive circular doubly linked list stored in parallel arrays. This is the
//! backing store every replacement policy in this crate is built on.
//!
//! # Layout
//!
//! ```text
//!   handle:      0 (sentinel)   1      2      3      4
//!              ┌─────────────┬──────┬──────┬──────┬──────┐
//!   next       │      2      │  3   │  1   │  0   │  0   │
//!   prev       │      3      │  2   │  0   │  1   │  0   │
//!   data       │    None     │ Some │ Some │ Some │ None │
//!              └─────────────┴──────┴──────┴──────┴──────┘
//!
//!   order:  0 ─► 2 ─► 1 ─► 3 ─► 0        (head = 2, tail = 3)
//!
//!   free_list: [ 0 | 2  1  3 | 4 ]       positions 1..=len are in use,
//!                                        len+1..=capacity is the free stack
//! ```
//!
//! `free_list` is always a permutation of every handle, sentinel included, and
//! `position` is its inverse, so a handle's place in either region is found in
//! constant time.
//!
//! Handle 0 never stores data. `next[0]` is the head of the order (the next
//! victim for FIFO/LRU) and `prev[0]` is the tail (the most recently added or
//! touched element).
//!
//! # Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `add` | O(1) amortized, O(capacity) on resize |
//! | `remove` / `remove_head` / `remove_tail` | O(1) |
//! | `touch` | O(1) |
//! | `peek_all` / `iter` | O(n) |
//!
//! # Handle Tolerance
//!
//! Operations taking a handle never panic on a bad handle. Out-of-range handles,
//! the sentinel, and handles whose slot is already free are treated as absent:
//! `remove` returns `None` and `touch` returns `false`. A handle removed twice
//! therefore yields its element once and `None` afterwards.
//!
//! # Thread Safety
//!
//! `IndexedList` is not synchronized. Callers hold one lock per logical cache
//! around every mutation, or use [`ConcurrentPolicy`](crate::concurrent::ConcurrentPolicy).

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::num::NonZeroUsize;

/// Slot index reserved for the list root.
const SENTINEL: usize = 0;

/// Initial capacity used by [`IndexedList::default`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Opaque reference to a slot in an [`IndexedList`].
///
/// Handles are stable across resizes: growing the index only lengthens the
/// backing arrays, it never renumbers slots. A handle is invalidated by removing
/// its element or clearing the index, after which the slot may be reused by a
/// later `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    /// The list root. Never refers to an element.
    pub const SENTINEL: Handle = Handle(SENTINEL);

    /// Builds a handle from a raw slot index.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Handle(index)
    }

    /// Returns the raw slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns `true` for the reserved root handle.
    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.0 == SENTINEL
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle-addressed arena that keeps its elements in eviction order.
///
/// Elements are appended at the tail by [`add`](Self::add), moved to the tail by
/// [`touch`](Self::touch), and taken from either end with
/// [`remove_head`](Self::remove_head) / [`remove_tail`](Self::remove_tail).
///
/// # Examples
///
/// ```
/// use coconut_policy::index::IndexedList;
///
/// let mut list = IndexedList::with_capacity(4);
/// let a = list.add("a");
/// let _b = list.add("b");
/// let _c = list.add("c");
///
/// // "a" becomes the most recently touched element
/// assert!(list.touch(a));
/// assert_eq!(list.remove_head(), Some("b"));
/// assert_eq!(list.peek_all(), vec![&"c", &"a"]);
/// ```
#[derive(Clone)]
pub struct IndexedList<T> {
    next: Vec<usize>,
    prev: Vec<usize>,
    data: Vec<Option<T>>,
    free_list: Vec<usize>,
    position: Vec<usize>,
    size: usize,
    initial_capacity: usize,
}

impl<T> IndexedList<T> {
    /// Creates an empty index able to hold `initial_capacity` elements before
    /// its first resize.
    pub fn new(initial_capacity: NonZeroUsize) -> Self {
        Self::allocate(initial_capacity.get())
    }

    /// Creates an empty index with the given initial capacity. A capacity of
    /// zero is promoted to one.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(initial_capacity).unwrap_or(NonZeroUsize::MIN))
    }

    fn allocate(capacity: usize) -> Self {
        let slots = capacity + 1;
        let mut data = Vec::with_capacity(slots);
        data.resize_with(slots, || None);
        IndexedList {
            next: alloc::vec![SENTINEL; slots],
            prev: alloc::vec![SENTINEL; slots],
            data,
            free_list: (0..slots).collect(),
            position: (0..slots).collect(),
            size: 0,
            initial_capacity: capacity,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` when no element is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of elements the index holds before its next resize.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.next.len() - 1
    }

    /// Capacity the index was created with and returns to on [`clear`](Self::clear).
    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns `true` if `handle` refers to a live element.
    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        handle.0 != SENTINEL && matches!(self.data.get(handle.0), Some(Some(_)))
    }

    /// Stores `element` at the tail of the eviction order and returns its handle.
    ///
    /// Recently freed handles are reused before fresh ones. When every slot is
    /// taken the backing arrays double first.
    pub fn add(&mut self, element: T) -> Handle {
        if self.size == self.capacity() {
            self.grow();
        }
        self.size += 1;
        let handle = self.free_list[self.size];
        self.data[handle] = Some(element);
        self.link_tail(handle);
        Handle(handle)
    }

    /// Removes the element for `handle`, returning it.
    ///
    /// Returns `None` for the sentinel, an out-of-range handle, or a slot that
    /// is already free.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let h = handle.0;
        if h == SENTINEL {
            return None;
        }
        let element = self.data.get_mut(h)?.take()?;
        self.unlink(h);
        self.next[h] = SENTINEL;
        self.prev[h] = SENTINEL;
        self.release(h);
        Some(element)
    }

    /// Removes and returns the element at the head of the order.
    #[inline]
    pub fn remove_head(&mut self) -> Option<T> {
        let head = self.next[SENTINEL];
        self.remove(Handle(head))
    }

    /// Removes and returns the element at the tail of the order.
    #[inline]
    pub fn remove_tail(&mut self) -> Option<T> {
        let tail = self.prev[SENTINEL];
        self.remove(Handle(tail))
    }

    /// Moves the element for `handle` to the tail of the order.
    ///
    /// Returns `false` without reordering anything when `handle` is not live.
    pub fn touch(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        let h = handle.0;
        if self.size > 1 && self.prev[SENTINEL] != h {
            self.unlink(h);
            self.link_tail(h);
        }
        true
    }

    /// Swaps the element stored for `handle` without changing its position.
    ///
    /// Returns the previous element, or gives `element` back as `Err` when the
    /// handle is not live.
    pub fn replace(&mut self, handle: Handle, element: T) -> Result<T, T> {
        match self.get_mut(handle) {
            Some(slot) => Ok(core::mem::replace(slot, element)),
            None => Err(element),
        }
    }

    /// The element for `handle`, or `None` when the handle is not live.
    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.data.get(handle.0).and_then(Option::as_ref)
    }

    /// Mutable access to the element for `handle`. Does not reorder.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.data.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// The next victim under a head-evicting policy.
    #[inline]
    pub fn peek_head(&self) -> Option<&T> {
        self.data[self.next[SENTINEL]].as_ref()
    }

    /// The most recently added or touched element.
    #[inline]
    pub fn peek_tail(&self) -> Option<&T> {
        self.data[self.prev[SENTINEL]].as_ref()
    }

    /// Handle of the head element, or `None` when empty.
    #[inline]
    pub fn head_handle(&self) -> Option<Handle> {
        match self.next[SENTINEL] {
            SENTINEL => None,
            h => Some(Handle(h)),
        }
    }

    /// Handle of the tail element, or `None` when empty.
    #[inline]
    pub fn tail_handle(&self) -> Option<Handle> {
        match self.prev[SENTINEL] {
            SENTINEL => None,
            h => Some(Handle(h)),
        }
    }

    /// Collects every element in eviction order, head first.
    ///
    /// This walks the whole list and allocates; it is meant for diagnostics and
    /// snapshots rather than the eviction path.
    pub fn peek_all(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// Iterates elements in eviction order, head first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.next[SENTINEL],
            back: self.prev[SENTINEL],
            remaining: self.size,
        }
    }

    /// Iterates live handles in eviction order, head first.
    pub fn handles(&self) -> Handles<'_, T> {
        Handles {
            list: self,
            front: self.next[SENTINEL],
            back: self.prev[SENTINEL],
            remaining: self.size,
        }
    }

    /// Drops every element and reallocates the arrays at the initial capacity.
    ///
    /// Growth is only ever undone here; removing elements keeps the grown arrays.
    pub fn clear(&mut self) {
        let capacity = self.capacity();
        if capacity != self.initial_capacity {
            log::debug!(
                "shrinking ordered eviction index from {} to {} slots on clear",
                capacity,
                self.initial_capacity
            );
        }
        *self = Self::allocate(self.initial_capacity);
    }

    fn grow(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity * 2;
        let slots = new_capacity + 1;
        log::debug!(
            "growing ordered eviction index from {} to {} slots",
            old_capacity,
            new_capacity
        );

        let mut next = Vec::with_capacity(slots);
        next.extend_from_slice(&self.next);
        next.resize(slots, SENTINEL);

        let mut prev = Vec::with_capacity(slots);
        prev.extend_from_slice(&self.prev);
        prev.resize(slots, SENTINEL);

        let mut data = Vec::with_capacity(slots);
        data.extend(self.data.drain(..));
        data.resize_with(slots, || None);

        let mut free_list = Vec::with_capacity(slots);
        free_list.extend_from_slice(&self.free_list);
        free_list.extend(old_capacity + 1..slots);

        let mut position = Vec::with_capacity(slots);
        position.extend_from_slice(&self.position);
        position.extend(old_capacity + 1..slots);

        self.next = next;
        self.prev = prev;
        self.data = data;
        self.free_list = free_list;
        self.position = position;
    }

    /// Moves `h` from the in-use region to the top of the free stack.
    ///
    /// `h` trades places with the last in-use handle, so `free_list` keeps
    /// every handle exactly once.
    #[inline]
    fn release(&mut self, h: usize) {
        let from = self.position[h];
        let last = self.free_list[self.size];
        self.free_list.swap(from, self.size);
        self.position[last] = from;
        self.position[h] = self.size;
        self.size -= 1;
    }

    #[inline]
    fn link_tail(&mut self, h: usize) {
        let tail = self.prev[SENTINEL];
        self.next[tail] = h;
        self.prev[h] = tail;
        self.next[h] = SENTINEL;
        self.prev[SENTINEL] = h;
    }

    #[inline]
    fn unlink(&mut self, h: usize) {
        let (p, n) = (self.prev[h], self.next[h]);
        self.next[p] = n;
        self.prev[n] = p;
    }

    /// Panics if any structural invariant of the index is broken.
    ///
    /// Checks the circular linkage and the element count. Also checks that
    /// `free_list` is a permutation split into live and free handles, with
    /// `position` as its inverse.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let capacity = self.capacity();
        assert_eq!(self.prev.len(), capacity + 1);
        assert_eq!(self.data.len(), capacity + 1);
        assert_eq!(self.free_list.len(), capacity + 1);
        assert_eq!(self.position.len(), capacity + 1);
        assert!(self.size <= capacity);
        assert!(self.data[SENTINEL].is_none(), "sentinel holds data");

        let mut seen = alloc::vec![false; capacity + 1];
        let mut current = SENTINEL;
        let mut steps = 0;
        loop {
            let n = self.next[current];
            assert_eq!(self.prev[n], current, "prev/next mismatch at {current}");
            if n == SENTINEL {
                break;
            }
            assert!(self.data[n].is_some(), "linked slot {n} has no data");
            assert!(!seen[n], "slot {n} linked twice");
            seen[n] = true;
            steps += 1;
            assert!(steps <= self.size, "order longer than len");
            current = n;
        }
        assert_eq!(steps, self.size, "order shorter than len");

        assert_eq!(self.free_list[0], SENTINEL, "sentinel left position 0");
        for (i, &h) in self.free_list.iter().enumerate() {
            assert!(h <= capacity, "bad handle {h} in free list");
            assert_eq!(self.position[h], i, "position of {h} out of sync");
        }
        for &h in &self.free_list[1..=self.size] {
            assert!(seen[h], "in-use handle {h} is not linked");
        }
        for &h in &self.free_list[self.size + 1..] {
            assert!(self.data[h].is_none(), "free handle {h} holds data");
        }
        let live = (1..=capacity).filter(|&h| self.data[h].is_some()).count();
        assert_eq!(live, self.size);
    }
}

impl<T> Default for IndexedList<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T> fmt::Debug for IndexedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedList")
            .field("len", &self.size)
            .field("capacity", &self.capacity())
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a IndexedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of an [`IndexedList`] in eviction order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    list: &'a IndexedList<T>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.front;
        self.front = self.list.next[h];
        self.remaining -= 1;
        self.list.data[h].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.back;
        self.back = self.list.prev[h];
        self.remaining -= 1;
        self.list.data[h].as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over the live handles of an [`IndexedList`] in eviction order.
#[derive(Debug)]
pub struct Handles<'a, T> {
    list: &'a IndexedList<T>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<T> Iterator for Handles<'_, T> {
    type Item = Handle;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.front;
        self.front = self.list.next[h];
        self.remaining -= 1;
        Some(Handle(h))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Handles<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let h = self.back;
        self.back = self.list.prev[h];
        self.remaining -= 1;
        Some(Handle(h))
    }
}

impl<T> ExactSizeIterator for Handles<'_, T> {}
impl<T> FusedIterator for Handles<'_, T> {}


#[cfg(test)]
mod property_tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    // Reference model: live handles in eviction order, with their values.
    fn position(model: &[(Handle, u32)], handle: Handle) -> Option<usize> {
        model.iter().position(|(h, _)| *h == handle)
    }

    proptest! {
        /// Property: Invariants hold after any sequence of operations
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_always_hold(
            initial in 1usize..6,
            ops in prop::collection::vec((0u8..6, any::<u32>(), 0usize..40), 0..200)
        ) {
            let mut list = IndexedList::with_capacity(initial);
            let mut issued: Vec<Handle> = Vec::new();

            for (op, value, pick) in ops {
                let handle = issued
                    .get(pick % issued.len().max(1))
                    .copied()
                    .unwrap_or(Handle::SENTINEL);
                match op {
                    0 | 1 => issued.push(list.add(value)),
                    2 => { list.remove(handle); }
                    3 => { list.touch(handle); }
                    4 => { list.remove_head(); }
                    _ => { list.remove_tail(); }
                }
                list.debug_validate_invariants();
            }
        }

        /// Property: the index orders elements exactly like a move-to-back queue
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_queue_model(
            ops in prop::collection::vec((0u8..5, any::<u32>(), 0usize..40), 0..150)
        ) {
            let mut list = IndexedList::with_capacity(2);
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut issued: Vec<Handle> = Vec::new();

            for (op, value, pick) in ops {
                let handle = issued
                    .get(pick % issued.len().max(1))
                    .copied()
                    .unwrap_or(Handle::SENTINEL);
                match op {
                    0 | 1 => {
                        let h = list.add(value);
                        prop_assert!(position(&model, h).is_none());
                        model.push((h, value));
                        issued.push(h);
                    }
                    2 => {
                        let expected = position(&model, handle).map(|i| model.remove(i).1);
                        prop_assert_eq!(list.remove(handle), expected);
                    }
                    3 => {
                        let expected = position(&model, handle);
                        if let Some(i) = expected {
                            let entry = model.remove(i);
                            model.push(entry);
                        }
                        prop_assert_eq!(list.touch(handle), expected.is_some());
                    }
                    _ => {
                        let expected = if model.is_empty() {
                            None
                        } else {
                            Some(model.remove(0).1)
                        };
                        prop_assert_eq!(list.remove_head(), expected);
                    }
                }

                let values: Vec<u32> = list.iter().copied().collect();
                let expected: Vec<u32> = model.iter().map(|(_, v)| *v).collect();
                prop_assert_eq!(values, expected);
                prop_assert_eq!(list.len(), model.len());
            }
        }

        /// Property: clear always returns the index to its initial capacity
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_clear_restores_initial_capacity(
            initial in 1usize..8,
            adds in 0usize..100
        ) {
            let mut list = IndexedList::with_capacity(initial);
            for i in 0..adds {
                list.add(i);
            }
            prop_assert!(list.capacity() >= adds);
            list.clear();
            prop_assert_eq!(list.capacity(), initial);
            prop_assert!(list.is_empty());
            list.debug_validate_invariants();
        }
    }
}
