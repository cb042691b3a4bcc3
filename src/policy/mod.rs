//! Replacement Policies
//!
//! A replacement policy decides which element a cache gives up when it needs
//! room. The cache registers every element with its policy, reports accesses,
//! and asks the policy for the next victim. The cache keeps its own key to
//! [`Handle`] map; policies only ever see elements and handles.
//!
//! # Capability Set
//!
//! | Method | Called by the cache when... |
//! |--------|-----------------------------|
//! | [`add`](ReplacementPolicy::add) | a new entry is inserted |
//! | [`touch`](ReplacementPolicy::touch) | an entry is hit |
//! | [`update`](ReplacementPolicy::update) | an entry's value is replaced |
//! | [`remove`](ReplacementPolicy::remove) | an entry is deleted or expires |
//! | [`evict_next`](ReplacementPolicy::evict_next) | capacity must be freed |
//! | [`peek`](ReplacementPolicy::peek) / [`peek_all`](ReplacementPolicy::peek_all) | inspecting victims |
//! | [`clear`](ReplacementPolicy::clear) | the cache is emptied |
//!
//! # Ordered Policies
//!
//! The policies in this module all keep their elements in one
//! [`IndexedList`] and differ only in which end they evict from and whether a
//! touch reorders. That choice is made by a [`Discipline`]:
//!
//! | Policy | Victim | Touch |
//! |--------|--------|-------|
//! | [`LruPolicy`] | head (least recently used) | moves to tail |
//! | [`MruPolicy`] | tail (most recently used) | moves to tail |
//! | [`FifoPolicy`] | head (oldest insertion) | ignored |
//! | [`LifoPolicy`] | tail (newest insertion) | ignored |
//!
//! # Examples
//!
//! ```
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::policy::{LruPolicy, ReplacementPolicy};
//!
//! let attrs = AttributeMap::new();
//! let mut policy = LruPolicy::with_capacity(8);
//!
//! let a = policy.add("a", &attrs).unwrap();
//! policy.add("b", &attrs);
//! policy.touch(a);
//!
//! assert_eq!(policy.evict_next(), Some("b"));
//! ```

extern crate alloc;

use crate::attributes::AttributeMap;
use crate::index::{Handle, Handles, IndexedList};
use crate::metrics::{CorePolicyMetrics, PolicyMetrics};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use core::num::NonZeroUsize;

pub mod fifo;
pub mod lifo;
pub mod lru;
pub mod mru;

pub use fifo::{Fifo, FifoPolicy};
pub use lifo::{Lifo, LifoPolicy};
pub use lru::{Lru, LruPolicy};
pub use mru::{Mru, MruPolicy};

/// The operations a cache performs on its replacement policy.
///
/// Handle arguments are tolerant: a handle that is stale, already removed, or
/// out of range makes `remove` return `None`, `update` return `false`, and
/// `touch` do nothing.
pub trait ReplacementPolicy<T>: PolicyMetrics {
    /// Registers `element`, returning its handle, or `None` if the policy
    /// refuses it.
    fn add(&mut self, element: T, attributes: &AttributeMap) -> Option<Handle>;

    /// Removes the element for `handle`.
    fn remove(&mut self, handle: Handle) -> Option<T>;

    /// Removes and returns the element the policy would evict next.
    fn evict_next(&mut self) -> Option<T>;

    /// The element [`evict_next`](Self::evict_next) would return.
    fn peek(&self) -> Option<&T>;

    /// Every element, next victim first.
    fn peek_all(&self) -> Vec<&T>;

    /// Records an access to the element for `handle`.
    fn touch(&mut self, handle: Handle);

    /// Returns `true` if an element with these attributes would be accepted
    /// by [`add`](Self::add).
    ///
    /// Lets a cache skip making room for an element the policy will refuse.
    fn admits(&self, attributes: &AttributeMap) -> bool {
        let _ = attributes;
        true
    }

    /// Replaces the element for `handle`.
    ///
    /// Returns `false` when the handle is not live or the new element is
    /// refused. On refusal the old element stays registered and the caller is
    /// expected to remove it.
    fn update(&mut self, handle: Handle, element: T, attributes: &AttributeMap) -> bool;

    /// Drops every element.
    fn clear(&mut self);

    /// Number of registered elements.
    fn len(&self) -> usize;

    /// Returns `true` when no element is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, P> ReplacementPolicy<T> for Box<P>
where
    P: ReplacementPolicy<T> + ?Sized,
{
    fn add(&mut self, element: T, attributes: &AttributeMap) -> Option<Handle> {
        (**self).add(element, attributes)
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        (**self).remove(handle)
    }

    fn evict_next(&mut self) -> Option<T> {
        (**self).evict_next()
    }

    fn peek(&self) -> Option<&T> {
        (**self).peek()
    }

    fn peek_all(&self) -> Vec<&T> {
        (**self).peek_all()
    }

    fn touch(&mut self, handle: Handle) {
        (**self).touch(handle)
    }

    fn admits(&self, attributes: &AttributeMap) -> bool {
        (**self).admits(attributes)
    }

    fn update(&mut self, handle: Handle, element: T, attributes: &AttributeMap) -> bool {
        (**self).update(handle, element, attributes)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

impl<P: PolicyMetrics + ?Sized> PolicyMetrics for Box<P> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        (**self).metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        (**self).algorithm_name()
    }

    fn core_counters(&self) -> CorePolicyMetrics {
        (**self).core_counters()
    }
}

/// Selects the eviction end and touch behaviour of an [`OrderedPolicy`].
///
/// Implement this on a marker type to define a new ordered policy without
/// writing any list handling.
pub trait Discipline {
    /// Reported by [`PolicyMetrics::algorithm_name`].
    const NAME: &'static str;

    /// Evict from the tail (newest end) instead of the head.
    const EVICT_FROM_TAIL: bool;

    /// Move touched and updated elements to the tail.
    const TOUCH_MOVES_TO_TAIL: bool;
}

/// A replacement policy over a single [`IndexedList`].
///
/// Use the aliases [`LruPolicy`], [`MruPolicy`], [`FifoPolicy`] and
/// [`LifoPolicy`] rather than naming this type directly.
pub struct OrderedPolicy<T, D> {
    index: IndexedList<T>,
    metrics: CorePolicyMetrics,
    _discipline: PhantomData<fn() -> D>,
}

impl<T, D: Discipline> OrderedPolicy<T, D> {
    /// Creates an empty policy whose index starts with room for
    /// `initial_capacity` elements.
    pub fn new(initial_capacity: NonZeroUsize) -> Self {
        OrderedPolicy {
            index: IndexedList::new(initial_capacity),
            metrics: CorePolicyMetrics::new(),
            _discipline: PhantomData,
        }
    }

    /// Like [`new`](Self::new); a capacity of zero is promoted to one.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        OrderedPolicy {
            index: IndexedList::with_capacity(initial_capacity),
            metrics: CorePolicyMetrics::new(),
            _discipline: PhantomData,
        }
    }

    /// The backing eviction index.
    #[inline]
    pub fn index(&self) -> &IndexedList<T> {
        &self.index
    }

    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.index.get(handle)
    }

    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.index.contains(handle)
    }

    /// Live handles, next victim first.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        VictimOrder::<Handles<'_, T>, D>::new(self.index.handles())
    }

    #[inline]
    pub fn core_metrics(&self) -> &CorePolicyMetrics {
        &self.metrics
    }
}

impl<T, D: Discipline> ReplacementPolicy<T> for OrderedPolicy<T, D> {
    fn add(&mut self, element: T, _attributes: &AttributeMap) -> Option<Handle> {
        let handle = self.index.add(element);
        self.metrics.record_insertion();
        Some(handle)
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        let element = self.index.remove(handle)?;
        self.metrics.record_removal();
        Some(element)
    }

    fn evict_next(&mut self) -> Option<T> {
        let victim = if D::EVICT_FROM_TAIL {
            self.index.remove_tail()
        } else {
            self.index.remove_head()
        }?;
        self.metrics.record_eviction();
        Some(victim)
    }

    fn peek(&self) -> Option<&T> {
        if D::EVICT_FROM_TAIL {
            self.index.peek_tail()
        } else {
            self.index.peek_head()
        }
    }

    fn peek_all(&self) -> Vec<&T> {
        if D::EVICT_FROM_TAIL {
            self.index.iter().rev().collect()
        } else {
            self.index.peek_all()
        }
    }

    fn touch(&mut self, handle: Handle) {
        let live = if D::TOUCH_MOVES_TO_TAIL {
            self.index.touch(handle)
        } else {
            self.index.contains(handle)
        };
        if live {
            self.metrics.record_touch();
        }
    }

    fn update(&mut self, handle: Handle, element: T, _attributes: &AttributeMap) -> bool {
        if self.index.replace(handle, element).is_err() {
            return false;
        }
        if D::TOUCH_MOVES_TO_TAIL {
            self.index.touch(handle);
        }
        self.metrics.record_update();
        true
    }

    fn clear(&mut self) {
        self.index.clear();
        self.metrics.record_clear();
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

impl<T, D: Discipline> PolicyMetrics for OrderedPolicy<T, D> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        D::NAME
    }

    fn core_counters(&self) -> CorePolicyMetrics {
        self.metrics.clone()
    }
}

impl<T, D: Discipline> Default for OrderedPolicy<T, D> {
    fn default() -> Self {
        OrderedPolicy {
            index: IndexedList::default(),
            metrics: CorePolicyMetrics::new(),
            _discipline: PhantomData,
        }
    }
}

impl<T: Clone, D> Clone for OrderedPolicy<T, D> {
    fn clone(&self) -> Self {
        OrderedPolicy {
            index: self.index.clone(),
            metrics: self.metrics.clone(),
            _discipline: PhantomData,
        }
    }
}

impl<T, D: Discipline> fmt::Debug for OrderedPolicy<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedPolicy")
            .field("algorithm", &D::NAME)
            .field("len", &self.index.len())
            .field("capacity", &self.index.capacity())
            .finish()
    }
}

/// Walks a double-ended iterator from the victim end.
struct VictimOrder<I, D> {
    inner: I,
    _discipline: PhantomData<fn() -> D>,
}

impl<I, D> VictimOrder<I, D> {
    fn new(inner: I) -> Self {
        VictimOrder {
            inner,
            _discipline: PhantomData,
        }
    }
}

impl<I: DoubleEndedIterator, D: Discipline> Iterator for VictimOrder<I, D> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if D::EVICT_FROM_TAIL {
            self.inner.next_back()
        } else {
            self.inner.next()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
