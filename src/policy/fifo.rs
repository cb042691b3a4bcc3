//! First In, First Out (FIFO) Policy
//!
//! Evicts elements in insertion order. Accesses are counted but never reorder
//! the eviction index, so the head is always the oldest insertion. Updating an
//! element replaces it in place without renewing its position.

use super::{Discipline, OrderedPolicy};

/// Marker selecting insertion-order eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl Discipline for Fifo {
    const NAME: &'static str = "FIFO";
    const EVICT_FROM_TAIL: bool = false;
    const TOUCH_MOVES_TO_TAIL: bool = false;
}

/// First In, First Out replacement policy.
///
/// # Examples
///
/// ```
/// use coconut_policy::attributes::AttributeMap;
/// use coconut_policy::policy::{FifoPolicy, ReplacementPolicy};
///
/// let attrs = AttributeMap::new();
/// let mut policy = FifoPolicy::with_capacity(2);
/// let first = policy.add(1, &attrs).unwrap();
/// policy.add(2, &attrs);
///
/// policy.touch(first);
/// assert_eq!(policy.evict_next(), Some(1));
/// ```
pub type FifoPolicy<T> = OrderedPolicy<T, Fifo>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::policy::ReplacementPolicy;

    #[test]
    fn test_fifo_ignores_touch_order() {
        let attrs = AttributeMap::new();
        let mut policy = FifoPolicy::with_capacity(2);
        let handles: alloc::vec::Vec<_> = (0..6).map(|i| policy.add(i, &attrs).unwrap()).collect();

        for &h in handles.iter().rev() {
            policy.touch(h);
        }
        for i in 0..6 {
            assert_eq!(policy.evict_next(), Some(i));
        }
        assert_eq!(policy.core_metrics().touches, 6);
    }

    #[test]
    fn test_fifo_touch_on_stale_handle_is_not_counted() {
        let attrs = AttributeMap::new();
        let mut policy = FifoPolicy::with_capacity(2);
        let h = policy.add(1, &attrs).unwrap();
        policy.remove(h);
        policy.touch(h);
        assert_eq!(policy.core_metrics().touches, 0);
    }
}
