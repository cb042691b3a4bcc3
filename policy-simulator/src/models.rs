// Data models for policy simulation

use coconut_policy::config::{FilterConfig, PolicyKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// A single cache request read from a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// Cache key
    pub key: String,
    /// Size of the object in bytes
    pub size: u64,
    /// Cost of recreating the object on a miss
    pub cost: f64,
}

impl Request {
    pub fn new(timestamp: u64, key: impl Into<String>, size: u64, cost: f64) -> Self {
        Self {
            timestamp,
            key: key.into(),
            size,
            cost,
        }
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Directory containing trace files
    pub input_dir: PathBuf,
    /// Cache capacity in number of entries
    pub capacity: usize,
    /// Policies to simulate
    pub policies: Vec<PolicyKind>,
    /// Admission filter applied to every policy
    pub filter: FilterConfig,
}

/// Results of a simulation run
#[derive(Debug)]
pub struct SimulationResult {
    /// Statistics for each policy
    pub stats: HashMap<PolicyKind, PolicyStats>,
    /// Total number of requests processed
    pub total_requests: usize,
    /// Total bytes requested
    pub total_bytes: u64,
    /// Number of unique keys in the trace
    pub unique_objects: usize,
    /// Duration of the simulation
    pub duration: Duration,
}

/// Statistics for a single policy
#[derive(Debug, Default, Clone)]
pub struct PolicyStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Misses the policy refused to cache
    pub rejections: usize,
    /// Entries evicted to make room
    pub evictions: usize,
    /// Bytes served from cache (hits)
    pub bytes_hit: u64,
    /// Bytes served from backend (misses)
    pub bytes_miss: u64,
    /// Total cost of every miss
    pub miss_cost: f64,
    /// Largest number of entries held at once
    pub peak_entries: usize,
    /// Time spent inside policy operations in nanoseconds
    pub policy_time_ns: u64,
    /// Counters reported by the policy itself at the end of the run
    pub policy_metrics: BTreeMap<String, f64>,
}

impl PolicyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate byte hit rate as percentage
    pub fn byte_hit_rate(&self) -> f64 {
        let total = self.bytes_hit + self.bytes_miss;
        if total > 0 {
            (self.bytes_hit as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Average nanoseconds per request spent in the policy
    pub fn avg_policy_ns(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.policy_time_ns as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub policy: String,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub byte_hit_rate: f64,
    pub bytes_hit: u64,
    pub bytes_miss: u64,
    pub miss_cost: f64,
    pub rejections: usize,
    pub evictions: usize,
    pub peak_entries: usize,
    pub policy_time_ns: u64,
    pub avg_policy_ns: f64,
}
