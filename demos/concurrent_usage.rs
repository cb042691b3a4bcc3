//! Concurrent Policy Usage Examples
//!
//! This example demonstrates sharing one replacement policy between threads.
//!
//! Run with: cargo run --example concurrent_usage --features concurrent

extern crate coconut_policy;

use coconut_policy::attributes::AttributeMap;
use coconut_policy::config::{PolicyConfig, PolicyKind};
use coconut_policy::{ConcurrentPolicy, LruPolicy, PolicyMetrics, ReplacementPolicy};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const BUDGET: usize = 1_000;

fn main() {
    println!("Concurrent Policy Usage");
    println!("=======================\n");

    basic_sharing();
    trimming_to_budget();
    boxed_from_config();
}

/// Producers register elements and hit their own recent ones.
fn basic_sharing() {
    println!("1. Four producers sharing one LRU policy");
    let policy = Arc::new(ConcurrentPolicy::new(LruPolicy::with_capacity(64)));
    let start = Instant::now();

    let producers: Vec<_> = (0..4u64)
        .map(|t| {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                let attrs = AttributeMap::new();
                for i in 0..10_000u64 {
                    if let Some(handle) = policy.add(t * 1_000_000 + i, &attrs) {
                        if i % 2 == 0 {
                            policy.touch(handle);
                        }
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        if producer.join().is_err() {
            eprintln!("producer panicked");
        }
    }

    println!("   registered {} elements in {:?}", policy.len(), start.elapsed());
    println!("   next victim: {:?}\n", policy.peek());
}

/// One thread keeps the policy under budget while others insert.
fn trimming_to_budget() {
    println!("2. Evicting down to a budget of {BUDGET} with with_lock");
    let policy = Arc::new(ConcurrentPolicy::new(LruPolicy::with_capacity(BUDGET)));

    let producers: Vec<_> = (0..3u64)
        .map(|t| {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                let attrs = AttributeMap::new();
                for i in 0..5_000u64 {
                    policy.add(t * 1_000_000 + i, &attrs);
                }
            })
        })
        .collect();

    let trimmer = {
        let policy = Arc::clone(&policy);
        thread::spawn(move || {
            let mut evicted = 0usize;
            for _ in 0..200 {
                evicted += policy.with_lock(|p| {
                    let mut n = 0;
                    while p.len() > BUDGET && p.evict_next().is_some() {
                        n += 1;
                    }
                    n
                });
                thread::yield_now();
            }
            evicted
        })
    };

    for producer in producers {
        if producer.join().is_err() {
            eprintln!("producer panicked");
        }
    }
    let evicted = trimmer.join().unwrap_or(0);

    // Final trim once all producers are done
    let tail = policy.with_lock(|p| {
        let mut n = 0;
        while p.len() > BUDGET && p.evict_next().is_some() {
            n += 1;
        }
        n
    });

    println!("   evicted {} elements, {} remain", evicted + tail, policy.len());
    println!("   evictions reported: {}\n", policy.metrics()["evictions"]);
}

/// Any configured policy can be shared as long as its elements are `Send`.
fn boxed_from_config() {
    println!("3. Sharing a policy built from configuration");
    let policy = match PolicyConfig::new(PolicyKind::Fifo).build_send::<String>() {
        Ok(policy) => Arc::new(ConcurrentPolicy::new(policy)),
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return;
        }
    };

    let workers: Vec<_> = (0..2)
        .map(|t| {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                for i in 0..3 {
                    policy.add(format!("worker-{t}-item-{i}"), &AttributeMap::new());
                }
            })
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    println!("   {} policy holds {:?}", policy.algorithm_name(), policy.peek_all());
}
