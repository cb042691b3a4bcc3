//! Most Recently Used (MRU) Policy
//!
//! Evicts the element accessed most recently. Touches move elements to the tail
//! of the eviction index exactly as in LRU, but victims are taken from the tail.
//!
//! MRU pays off for cyclic scans larger than the cache, where the element just
//! used is the one needed furthest in the future.

use super::{Discipline, OrderedPolicy};

/// Marker selecting most-recently-used eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mru;

impl Discipline for Mru {
    const NAME: &'static str = "MRU";
    const EVICT_FROM_TAIL: bool = true;
    const TOUCH_MOVES_TO_TAIL: bool = true;
}

/// Most Recently Used replacement policy.
pub type MruPolicy<T> = OrderedPolicy<T, Mru>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::policy::ReplacementPolicy;
    use alloc::vec;

    #[test]
    fn test_mru_evicts_last_touched() {
        let attrs = AttributeMap::new();
        let mut policy = MruPolicy::with_capacity(3);
        let a = policy.add('A', &attrs).unwrap();
        policy.add('B', &attrs);
        policy.add('C', &attrs);

        assert_eq!(policy.peek(), Some(&'C'));
        policy.touch(a);
        assert_eq!(policy.peek_all(), vec![&'A', &'C', &'B']);
        assert_eq!(policy.evict_next(), Some('A'));
        assert_eq!(policy.evict_next(), Some('C'));
    }
}
