//! Simulation runner for replacement policies
//!
//! Every selected policy is driven by its own simulated cache, and each request
//! from the trace is fed to all of them before the next one is read. The trace
//! is streamed, so memory stays proportional to the cache capacity and the
//! number of distinct keys rather than the trace length.
//!
//! The simulated cache holds no values. It keeps only the key to handle map a
//! real cache would keep next to its policy; sizes and costs from the trace
//! are passed to the policy as element attributes.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Instant;

use coconut_policy::attributes::AttributeMap;
use coconut_policy::config::{PolicyConfig, PolicyKind};
use coconut_policy::{Handle, PolicyMetrics, ReplacementPolicy};
use hashbrown::HashSet;

use crate::input::{TraceError, TraceReader};
use crate::models::{PolicyStats, Request, SimulationConfig, SimulationResult};

/// Outcome of a single request against a simulated cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Hit,
    /// Missed and the key is now cached
    Admitted,
    /// Missed and the policy refused the key
    Rejected,
}

/// A key-only cache driven by one replacement policy
pub struct SimulatedCache {
    capacity: usize,
    entries: hashbrown::HashMap<String, Handle>,
    policy: Box<dyn ReplacementPolicy<String>>,
    stats: PolicyStats,
}

impl SimulatedCache {
    pub fn new(capacity: usize, policy: Box<dyn ReplacementPolicy<String>>) -> Self {
        Self {
            capacity,
            entries: hashbrown::HashMap::with_capacity(capacity),
            policy,
            stats: PolicyStats::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> &PolicyStats {
        &self.stats
    }

    /// Serve one request, updating the policy and the statistics
    pub fn access(&mut self, request: &Request) -> Access {
        if let Some(&handle) = self.entries.get(&request.key) {
            let start = Instant::now();
            self.policy.touch(handle);
            self.stats.policy_time_ns += start.elapsed().as_nanos() as u64;

            self.stats.hits += 1;
            self.stats.bytes_hit += request.size;
            return Access::Hit;
        }

        self.stats.misses += 1;
        self.stats.bytes_miss += request.size;
        self.stats.miss_cost += request.cost;

        let attributes = AttributeMap::new()
            .with_cost(request.cost)
            .with_size(request.size);

        let start = Instant::now();
        // Make room before inserting so policies that evict the newest element
        // do not immediately give up the key being admitted. Keys the policy
        // will refuse never displace a resident.
        let mut victims = Vec::new();
        while self.policy.len() >= self.capacity && self.policy.admits(&attributes) {
            match self.policy.evict_next() {
                Some(victim) => victims.push(victim),
                None => break,
            }
        }
        let handle = self.policy.add(request.key.clone(), &attributes);
        self.stats.policy_time_ns += start.elapsed().as_nanos() as u64;

        self.stats.evictions += victims.len();
        for victim in victims {
            self.entries.remove(&victim);
        }

        match handle {
            Some(handle) => {
                self.entries.insert(request.key.clone(), handle);
                self.stats.peak_entries = self.stats.peak_entries.max(self.entries.len());
                Access::Admitted
            }
            None => {
                self.stats.rejections += 1;
                Access::Rejected
            }
        }
    }

    /// Finish the run, attaching the policy's own counters to the statistics
    pub fn into_stats(self) -> PolicyStats {
        let mut stats = self.stats;
        stats.policy_metrics = self.policy.metrics();
        stats
    }
}

/// Runs one trace against every configured policy
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    fn build_caches(&self) -> Result<Vec<(PolicyKind, SimulatedCache)>, TraceError> {
        let initial_capacity =
            NonZeroUsize::new(self.config.capacity).unwrap_or(NonZeroUsize::MIN);

        let mut caches = Vec::with_capacity(self.config.policies.len());
        for &kind in &self.config.policies {
            let policy = PolicyConfig {
                kind,
                initial_capacity,
                filter: self.config.filter,
            }
            .build::<String>()?;
            caches.push((kind, SimulatedCache::new(self.config.capacity, policy)));
        }
        Ok(caches)
    }

    /// Stream the trace once, feeding every request to every policy
    pub fn run(&self) -> Result<SimulationResult, TraceError> {
        let start = Instant::now();
        let mut caches = self.build_caches()?;

        let mut total_requests = 0;
        let mut total_bytes = 0;
        let mut unique_keys: HashSet<String> = HashSet::new();

        let reader = TraceReader::new(&self.config.input_dir);
        for request in reader.stream_requests()? {
            let request = request?;
            total_requests += 1;
            total_bytes += request.size;
            if !unique_keys.contains(&request.key) {
                unique_keys.insert(request.key.clone());
            }

            for (_, cache) in caches.iter_mut() {
                cache.access(&request);
            }

            if total_requests % 100_000 == 0 {
                println!("Processed {total_requests} requests");
            }
        }

        let stats: HashMap<PolicyKind, PolicyStats> = caches
            .into_iter()
            .map(|(kind, cache)| (kind, cache.into_stats()))
            .collect();

        Ok(SimulationResult {
            stats,
            total_requests,
            total_bytes,
            unique_objects: unique_keys.len(),
            duration: start.elapsed(),
        })
    }
}
