//! Policy Decorators
//!
//! Decorators wrap a [`ReplacementPolicy`] and intercept some of its calls while
//! forwarding the rest unchanged. They hold no state of their own beyond the
//! wrapped policy and whatever they need to make their decision.
//!
//! ```text
//!   cache ──► FilteredPolicy ──accept?──► LruPolicy ──► IndexedList
//!                   │
//!                   └──reject──► None / false   (inner policy never sees it)
//! ```
//!
//! - [`PolicyDecorator`] forwards everything. It is the starting point for
//!   decorators that only need to observe calls.
//! - [`FilteredPolicy`] consults an [`AttributeFilter`] on `add` and `update`
//!   and refuses elements that fail it.
//!
//! # Examples
//!
//! ```
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::decorator::{FilteredPolicy, MaximumSizeFilter};
//! use coconut_policy::policy::{FifoPolicy, ReplacementPolicy};
//!
//! let mut policy = FilteredPolicy::new(
//!     FifoPolicy::with_capacity(8),
//!     MaximumSizeFilter::new(1024),
//! );
//!
//! assert!(policy.add("small", &AttributeMap::new().with_size(512)).is_some());
//! assert!(policy.add("large", &AttributeMap::new().with_size(4096)).is_none());
//! assert_eq!(policy.len(), 1);
//! ```

extern crate alloc;

use crate::attributes::AttributeMap;
use crate::index::Handle;
use crate::metrics::{CorePolicyMetrics, PolicyMetrics};
use crate::policy::ReplacementPolicy;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A decorator that forwards every call to the wrapped policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyDecorator<P> {
    inner: P,
}

impl<P> PolicyDecorator<P> {
    pub fn new(inner: P) -> Self {
        PolicyDecorator { inner }
    }

    #[inline]
    pub fn inner(&self) -> &P {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<T, P: ReplacementPolicy<T>> ReplacementPolicy<T> for PolicyDecorator<P> {
    fn add(&mut self, element: T, attributes: &AttributeMap) -> Option<Handle> {
        self.inner.add(element, attributes)
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        self.inner.remove(handle)
    }

    fn evict_next(&mut self) -> Option<T> {
        self.inner.evict_next()
    }

    fn peek(&self) -> Option<&T> {
        self.inner.peek()
    }

    fn peek_all(&self) -> Vec<&T> {
        self.inner.peek_all()
    }

    fn touch(&mut self, handle: Handle) {
        self.inner.touch(handle)
    }

    fn admits(&self, attributes: &AttributeMap) -> bool {
        self.inner.admits(attributes)
    }

    fn update(&mut self, handle: Handle, element: T, attributes: &AttributeMap) -> bool {
        self.inner.update(handle, element, attributes)
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<P: PolicyMetrics> PolicyMetrics for PolicyDecorator<P> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.inner.algorithm_name()
    }

    fn core_counters(&self) -> CorePolicyMetrics {
        self.inner.core_counters()
    }
}

/// Predicate over an element's attributes.
pub trait AttributeFilter {
    /// Returns `true` if an element with these attributes may enter the policy.
    fn accept(&self, attributes: &AttributeMap) -> bool;
}

impl<F> AttributeFilter for F
where
    F: Fn(&AttributeMap) -> bool,
{
    fn accept(&self, attributes: &AttributeMap) -> bool {
        self(attributes)
    }
}

/// Rejects elements whose cost is below a minimum.
///
/// Elements without a cost attribute are judged at
/// [`DEFAULT_COST`](crate::attributes::DEFAULT_COST).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumCostFilter {
    pub minimum_cost: f64,
}

impl MinimumCostFilter {
    pub fn new(minimum_cost: f64) -> Self {
        MinimumCostFilter { minimum_cost }
    }
}

impl AttributeFilter for MinimumCostFilter {
    fn accept(&self, attributes: &AttributeMap) -> bool {
        attributes.cost() >= self.minimum_cost
    }
}

/// Rejects elements whose size exceeds a maximum.
///
/// Elements without a size attribute are judged at
/// [`DEFAULT_SIZE`](crate::attributes::DEFAULT_SIZE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaximumSizeFilter {
    pub maximum_size: u64,
}

impl MaximumSizeFilter {
    pub fn new(maximum_size: u64) -> Self {
        MaximumSizeFilter { maximum_size }
    }
}

impl AttributeFilter for MaximumSizeFilter {
    fn accept(&self, attributes: &AttributeMap) -> bool {
        attributes.size() <= self.maximum_size
    }
}

/// Accepts only when both filters accept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllOf<A, B>(pub A, pub B);

impl<A: AttributeFilter, B: AttributeFilter> AttributeFilter for AllOf<A, B> {
    fn accept(&self, attributes: &AttributeMap) -> bool {
        self.0.accept(attributes) && self.1.accept(attributes)
    }
}

/// Accepts every element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl AttributeFilter for AcceptAll {
    fn accept(&self, _attributes: &AttributeMap) -> bool {
        true
    }
}

/// A decorator that refuses elements failing an [`AttributeFilter`].
///
/// A refused `add` returns `None` and a refused `update` returns `false`; in
/// both cases the wrapped policy is not called. Every other call is forwarded
/// unchanged. Refusals are recorded in this decorator's own
/// [`CorePolicyMetrics`], which are merged with the wrapped policy's counters
/// when metrics are reported.
pub struct FilteredPolicy<P, F> {
    inner: P,
    filter: F,
    metrics: CorePolicyMetrics,
}

impl<P, F: AttributeFilter> FilteredPolicy<P, F> {
    pub fn new(inner: P, filter: F) -> Self {
        FilteredPolicy {
            inner,
            filter,
            metrics: CorePolicyMetrics::new(),
        }
    }

    #[inline]
    pub fn inner(&self) -> &P {
        &self.inner
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    #[inline]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Number of elements refused so far.
    #[inline]
    pub fn rejections(&self) -> u64 {
        self.metrics.rejections
    }

    /// Counters recorded by this decorator alone.
    #[inline]
    pub fn core_metrics(&self) -> &CorePolicyMetrics {
        &self.metrics
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn admit(&mut self, attributes: &AttributeMap) -> bool {
        if self.filter.accept(attributes) {
            return true;
        }
        self.metrics.record_rejection();
        log::trace!(
            "filter rejected element (cost {}, size {})",
            attributes.cost(),
            attributes.size()
        );
        false
    }
}

impl<T, P, F> ReplacementPolicy<T> for FilteredPolicy<P, F>
where
    P: ReplacementPolicy<T>,
    F: AttributeFilter,
{
    fn add(&mut self, element: T, attributes: &AttributeMap) -> Option<Handle> {
        if !self.admit(attributes) {
            return None;
        }
        self.inner.add(element, attributes)
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        self.inner.remove(handle)
    }

    fn evict_next(&mut self) -> Option<T> {
        self.inner.evict_next()
    }

    fn peek(&self) -> Option<&T> {
        self.inner.peek()
    }

    fn peek_all(&self) -> Vec<&T> {
        self.inner.peek_all()
    }

    fn touch(&mut self, handle: Handle) {
        self.inner.touch(handle)
    }

    fn admits(&self, attributes: &AttributeMap) -> bool {
        self.filter.accept(attributes) && self.inner.admits(attributes)
    }

    fn update(&mut self, handle: Handle, element: T, attributes: &AttributeMap) -> bool {
        if !self.admit(attributes) {
            return false;
        }
        self.inner.update(handle, element, attributes)
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<P: PolicyMetrics, F> PolicyMetrics for FilteredPolicy<P, F> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.inner.metrics();
        metrics.extend(self.core_counters().to_btreemap());
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        self.inner.algorithm_name()
    }

    fn core_counters(&self) -> CorePolicyMetrics {
        let mut counters = self.inner.core_counters();
        counters.merge(&self.metrics);
        counters
    }
}

impl<P: fmt::Debug, F: fmt::Debug> fmt::Debug for FilteredPolicy<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredPolicy")
            .field("inner", &self.inner)
            .field("filter", &self.filter)
            .field("rejections", &self.metrics.rejections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FifoPolicy, LruPolicy};
    use alloc::vec;

    #[test]
    fn test_minimum_cost_filter() {
        let filter = MinimumCostFilter::new(2.0);
        assert!(!filter.accept(&AttributeMap::new()));
        assert!(!filter.accept(&AttributeMap::new().with_cost(1.5)));
        assert!(filter.accept(&AttributeMap::new().with_cost(2.0)));
    }

    #[test]
    fn test_maximum_size_filter() {
        let filter = MaximumSizeFilter::new(10);
        assert!(filter.accept(&AttributeMap::new()));
        assert!(filter.accept(&AttributeMap::new().with_size(10)));
        assert!(!filter.accept(&AttributeMap::new().with_size(11)));
    }

    #[test]
    fn test_rejected_add_never_reaches_inner() {
        let mut policy = FilteredPolicy::new(FifoPolicy::with_capacity(4), MinimumCostFilter::new(5.0));

        assert_eq!(policy.add(1, &AttributeMap::new().with_cost(1.0)), None);
        let h = policy.add(2, &AttributeMap::new().with_cost(9.0)).unwrap();

        assert_eq!(policy.len(), 1);
        assert_eq!(policy.inner().core_metrics().insertions, 1);
        assert_eq!(policy.rejections(), 1);
        assert_eq!(policy.remove(h), Some(2));
    }

    #[test]
    fn test_rejected_update_keeps_old_element() {
        let mut policy = FilteredPolicy::new(LruPolicy::with_capacity(4), MaximumSizeFilter::new(100));
        let h = policy.add("old", &AttributeMap::new().with_size(50)).unwrap();

        assert!(!policy.update(h, "huge", &AttributeMap::new().with_size(500)));
        assert_eq!(policy.peek(), Some(&"old"));
        assert!(policy.update(h, "new", &AttributeMap::new().with_size(60)));
        assert_eq!(policy.peek(), Some(&"new"));
    }

    #[test]
    fn test_closure_filter_and_all_of() {
        let even_cost = |attrs: &AttributeMap| attrs.cost() as u64 % 2 == 0;
        let filter = AllOf(even_cost, MaximumSizeFilter::new(8));
        let mut policy = FilteredPolicy::new(FifoPolicy::with_capacity(2), filter);

        assert!(policy.add('a', &AttributeMap::new().with_cost(2.0)).is_some());
        assert!(policy.add('b', &AttributeMap::new().with_cost(3.0)).is_none());
        assert!(policy.add('c', &AttributeMap::new().with_cost(4.0).with_size(9)).is_none());
        assert_eq!(policy.peek_all(), vec![&'a']);
    }

    #[test]
    fn test_stacked_filters_sum_rejections() {
        let inner = FilteredPolicy::new(FifoPolicy::with_capacity(2), MaximumSizeFilter::new(8));
        let mut policy = FilteredPolicy::new(inner, MinimumCostFilter::new(1.0));

        policy.add(1, &AttributeMap::new().with_cost(0.5));
        policy.add(2, &AttributeMap::new().with_size(100));
        policy.add(3, &AttributeMap::new());

        let metrics = policy.metrics();
        assert_eq!(metrics["rejections"], 2.0);
        assert_eq!(metrics["insertions"], 1.0);
        assert!((metrics["rejection_rate"] - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(policy.algorithm_name(), "FIFO");
    }

    #[test]
    fn test_infinite_size_is_rejected() {
        let mut policy = FilteredPolicy::new(FifoPolicy::with_capacity(2), MaximumSizeFilter::new(10));
        let huge = AttributeMap::new().with(crate::attributes::SIZE, f64::INFINITY);

        assert!(!policy.admits(&huge));
        assert_eq!(policy.add("huge", &huge), None);
        assert!(policy.is_empty());
        assert_eq!(policy.rejections(), 1);
    }

    #[test]
    fn test_rejections_recorded_in_core_counters() {
        let mut policy = FilteredPolicy::new(LruPolicy::with_capacity(2), MinimumCostFilter::new(2.0));
        policy.add(1, &AttributeMap::new().with_cost(1.0));
        policy.add(2, &AttributeMap::new().with_cost(3.0));

        assert_eq!(policy.core_metrics().rejections, 1);
        assert_eq!(policy.inner().core_metrics().rejections, 0);

        let counters = policy.core_counters();
        assert_eq!(counters.rejections, 1);
        assert_eq!(counters.insertions, 1);
        assert_eq!(counters.rejection_rate(), 0.5);
        assert_eq!(policy.metrics()["rejection_rate"], 0.5);
    }

    #[test]
    fn test_admits_checks_every_layer() {
        let inner = FilteredPolicy::new(FifoPolicy::<u8>::with_capacity(2), MaximumSizeFilter::new(8));
        let policy = FilteredPolicy::new(inner, MinimumCostFilter::new(1.0));

        assert!(policy.admits(&AttributeMap::new()));
        assert!(!policy.admits(&AttributeMap::new().with_cost(0.5)));
        assert!(!policy.admits(&AttributeMap::new().with_size(9)));
        // Checking admission never counts as a rejection
        assert_eq!(policy.core_counters().rejections, 0);
    }

    #[test]
    fn test_plain_decorator_forwards() {
        let mut policy = PolicyDecorator::new(LruPolicy::with_capacity(2));
        let attrs = AttributeMap::new();
        let a = policy.add(1, &attrs).unwrap();
        policy.add(2, &attrs);
        policy.touch(a);

        assert_eq!(policy.evict_next(), Some(2));
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.inner().core_metrics().touches, 1);
        policy.clear();
        assert!(policy.into_inner().is_empty());
    }
}
