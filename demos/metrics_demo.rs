//! Policy Metrics Demonstration
//!
//! Runs the same workload against every ordered policy, with and without an
//! admission filter, and prints the counters each one reports.

use coconut_policy::attributes::AttributeMap;
use coconut_policy::config::{FilterConfig, PolicyConfig, PolicyKind};
use coconut_policy::{Handle, PolicyMetrics, ReplacementPolicy};
use core::num::NonZeroUsize;
use std::collections::{BTreeMap, HashMap};

const CAPACITY: usize = 3;

fn run_workload(policy: &mut dyn ReplacementPolicy<u32>) {
    let mut live: HashMap<u32, Handle> = HashMap::new();
    for i in 0..12u32 {
        // Every third element is cheap and large
        let attrs = if i % 3 == 0 {
            AttributeMap::new().with_cost(0.1).with_size(4096)
        } else {
            AttributeMap::new().with_cost(5.0).with_size(64)
        };

        if live.len() == CAPACITY {
            if let Some(victim) = policy.evict_next() {
                live.remove(&victim);
            }
        }
        if let Some(handle) = policy.add(i, &attrs) {
            live.insert(i, handle);
        }
        // Element 1 is hot while it stays cached
        if let Some(handle) = live.get(&1) {
            policy.touch(*handle);
        }
    }
}

fn display(name: &str, metrics: &BTreeMap<String, f64>) {
    println!("{name}");
    for (key, value) in metrics {
        println!("   {key:<16} {value:>8.3}");
    }
    println!();
}

fn main() {
    println!("Policy Metrics - Complete Demonstration");
    println!("=======================================\n");

    let filter = FilterConfig {
        minimum_cost: Some(1.0),
        maximum_size: Some(1024),
    };

    for kind in PolicyKind::ALL {
        for filter in [FilterConfig::default(), filter] {
            let config = PolicyConfig {
                kind,
                initial_capacity: NonZeroUsize::new(CAPACITY).unwrap(),
                filter,
            };
            let mut policy = match config.build::<u32>() {
                Ok(policy) => policy,
                Err(err) => {
                    eprintln!("invalid configuration: {err}");
                    return;
                }
            };
            run_workload(policy.as_mut());

            let label = if filter.is_unbounded() {
                format!("{} (unfiltered)", policy.algorithm_name())
            } else {
                format!("{} (cost >= 1.0, size <= 1024)", policy.algorithm_name())
            };
            display(&label, &policy.metrics());
        }
    }
}
