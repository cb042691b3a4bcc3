//! Last In, First Out (LIFO) Policy
//!
//! Evicts the newest insertion first; accesses never reorder.

use super::{Discipline, OrderedPolicy};

/// Marker selecting newest-insertion eviction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifo;

impl Discipline for Lifo {
    const NAME: &'static str = "LIFO";
    const EVICT_FROM_TAIL: bool = true;
    const TOUCH_MOVES_TO_TAIL: bool = false;
}

/// Last In, First Out replacement policy.
pub type LifoPolicy<T> = OrderedPolicy<T, Lifo>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::policy::ReplacementPolicy;
    use alloc::vec;

    #[test]
    fn test_lifo_evicts_newest() {
        let attrs = AttributeMap::new();
        let mut policy = LifoPolicy::with_capacity(4);
        let a = policy.add("a", &attrs).unwrap();
        policy.add("b", &attrs);
        policy.add("c", &attrs);

        policy.touch(a);
        assert_eq!(policy.peek_all(), vec![&"c", &"b", &"a"]);
        assert_eq!(policy.evict_next(), Some("c"));
        assert_eq!(policy.evict_next(), Some("b"));
        assert_eq!(policy.evict_next(), Some("a"));
    }
}
