extern crate coconut_policy;

use coconut_policy::attributes::AttributeMap;
use coconut_policy::config::{PolicyConfig, PolicyKind};
use coconut_policy::{Handle, ReplacementPolicy};
use std::collections::HashMap;

/// A minimal cache: the key to handle map lives here, eviction order in the policy.
struct DemoCache {
    capacity: usize,
    entries: HashMap<&'static str, Handle>,
    policy: Box<dyn ReplacementPolicy<&'static str>>,
}

impl DemoCache {
    fn new(kind: PolicyKind, capacity: usize) -> Self {
        let policy = match PolicyConfig::new(kind).build() {
            Ok(policy) => policy,
            Err(err) => panic!("default configuration rejected: {err}"),
        };
        DemoCache {
            capacity,
            entries: HashMap::new(),
            policy,
        }
    }

    /// Returns the evicted key, if the access caused an eviction.
    fn access(&mut self, key: &'static str) -> Option<&'static str> {
        if let Some(handle) = self.entries.get(key) {
            self.policy.touch(*handle);
            return None;
        }
        let mut evicted = None;
        if self.entries.len() == self.capacity {
            evicted = self.policy.evict_next();
            if let Some(victim) = evicted {
                self.entries.remove(victim);
            }
        }
        if let Some(handle) = self.policy.add(key, &AttributeMap::new()) {
            self.entries.insert(key, handle);
        }
        evicted
    }
}

fn main() {
    println!("Replacement Policy Comparison");
    println!("=============================");
    println!("Each cache holds 3 items.");
    println!("We add 3 fruits, access 'apple' again, then add 'date' and 'elderberry'.\n");

    let workload = ["apple", "banana", "cherry", "apple", "date", "elderberry"];

    for kind in PolicyKind::ALL {
        let mut cache = DemoCache::new(kind, 3);
        let evicted: Vec<&str> = workload
            .iter()
            .filter_map(|&key| cache.access(key))
            .collect();

        let mut remaining: Vec<&str> = cache.entries.keys().copied().collect();
        remaining.sort_unstable();

        println!("{kind}:");
        println!("  evicted:   {evicted:?}");
        println!("  remaining: {remaining:?}");
        println!("  next victim: {:?}\n", cache.policy.peek());
    }
}
