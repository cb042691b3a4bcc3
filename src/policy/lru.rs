//! Least Recently Used (LRU) Policy
//!
//! Evicts the element that has gone longest without an access. Every
//! [`touch`](super::ReplacementPolicy::touch) and
//! [`update`](super::ReplacementPolicy::update) moves the element to the tail of
//! the eviction index, so the head is always the least recently used element.
//!
//! # When to Use
//!
//! LRU suits workloads with temporal locality: something used recently is
//! likely to be used again soon. It degrades on large one-pass scans, which
//! flush the whole working set.

use super::{Discipline, OrderedPolicy};

/// Marker selecting least-recently-used eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lru;

impl Discipline for Lru {
    const NAME: &'static str = "LRU";
    const EVICT_FROM_TAIL: bool = false;
    const TOUCH_MOVES_TO_TAIL: bool = true;
}

/// Least Recently Used replacement policy.
///
/// # Examples
///
/// ```
/// use coconut_policy::attributes::AttributeMap;
/// use coconut_policy::policy::{LruPolicy, ReplacementPolicy};
///
/// let attrs = AttributeMap::new();
/// let mut policy = LruPolicy::with_capacity(3);
/// let a = policy.add("A", &attrs).unwrap();
/// policy.add("B", &attrs);
/// policy.add("C", &attrs);
///
/// policy.touch(a);
/// assert_eq!(policy.evict_next(), Some("B"));
/// assert_eq!(policy.peek_all(), vec![&"C", &"A"]);
/// ```
pub type LruPolicy<T> = OrderedPolicy<T, Lru>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::metrics::PolicyMetrics;
    use crate::policy::ReplacementPolicy;
    use alloc::vec;

    #[test]
    fn test_lru_touch_protects_element() {
        let attrs = AttributeMap::new();
        let mut policy = LruPolicy::with_capacity(3);
        let a = policy.add('A', &attrs).unwrap();
        let b = policy.add('B', &attrs).unwrap();
        policy.add('C', &attrs);

        policy.touch(a);
        policy.touch(b);
        assert_eq!(policy.peek(), Some(&'C'));
        assert_eq!(policy.evict_next(), Some('C'));
        assert_eq!(policy.evict_next(), Some('A'));
        assert_eq!(policy.evict_next(), Some('B'));
        assert_eq!(policy.evict_next(), None);
    }

    #[test]
    fn test_lru_update_counts_as_access() {
        let attrs = AttributeMap::new();
        let mut policy = LruPolicy::with_capacity(2);
        let a = policy.add(1, &attrs).unwrap();
        policy.add(2, &attrs);

        assert!(policy.update(a, 10, &attrs));
        assert_eq!(policy.peek_all(), vec![&2, &10]);
    }

    #[test]
    fn test_lru_metrics() {
        let attrs = AttributeMap::new();
        let mut policy = LruPolicy::with_capacity(2);
        let a = policy.add(1, &attrs).unwrap();
        policy.add(2, &attrs);
        policy.touch(a);
        policy.touch(a);
        policy.evict_next();
        policy.remove(a);
        policy.remove(a);

        let metrics = policy.metrics();
        assert_eq!(policy.algorithm_name(), "LRU");
        assert_eq!(metrics["insertions"], 2.0);
        assert_eq!(metrics["touches"], 2.0);
        assert_eq!(metrics["evictions"], 1.0);
        assert_eq!(metrics["removals"], 1.0);
    }
}
