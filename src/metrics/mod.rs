//! Policy Metrics System
//!
//! Provides BTreeMap-based metrics reporting for replacement policies. Every
//! policy in this crate records the same [`CorePolicyMetrics`] counters and
//! reports them through the [`PolicyMetrics`] trait.
//!
//! BTreeMap keeps the keys in a fixed order, so reports from different policies
//! line up row for row when compared side by side.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters shared by every replacement policy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CorePolicyMetrics {
    /// Elements accepted by `add`
    pub insertions: u64,

    /// Elements refused by a filter on `add` or `update`
    pub rejections: u64,

    /// Elements removed explicitly through `remove`
    pub removals: u64,

    /// Elements removed as the next victim through `evict_next`
    pub evictions: u64,

    /// Accesses recorded through `touch` on live handles
    pub touches: u64,

    /// Elements replaced through `update`
    pub updates: u64,

    /// Calls to `clear`
    pub clears: u64,
}

impl CorePolicyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    #[inline]
    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    #[inline]
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub fn record_touch(&mut self) {
        self.touches += 1;
    }

    #[inline]
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    #[inline]
    pub fn record_clear(&mut self) {
        self.clears += 1;
    }

    /// Fraction of insertions that were later evicted.
    ///
    /// Returns 0.0 when nothing has been inserted.
    pub fn eviction_rate(&self) -> f64 {
        if self.insertions > 0 {
            self.evictions as f64 / self.insertions as f64
        } else {
            0.0
        }
    }

    /// Fraction of add/update attempts refused by a filter.
    ///
    /// Returns 0.0 when nothing has been offered.
    pub fn rejection_rate(&self) -> f64 {
        let offered = self.insertions + self.updates + self.rejections;
        if offered > 0 {
            self.rejections as f64 / offered as f64
        } else {
            0.0
        }
    }

    /// Folds another set of counters into this one.
    pub fn merge(&mut self, other: &CorePolicyMetrics) {
        self.insertions += other.insertions;
        self.rejections += other.rejections;
        self.removals += other.removals;
        self.evictions += other.evictions;
        self.touches += other.touches;
        self.updates += other.updates;
        self.clears += other.clears;
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("clears".to_string(), self.clears as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("rejections".to_string(), self.rejections as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("touches".to_string(), self.touches as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("eviction_rate".to_string(), self.eviction_rate());
        metrics.insert("rejection_rate".to_string(), self.rejection_rate());

        metrics
    }
}

/// Uniform metrics access for replacement policies.
///
/// Lets callers collect and compare counters from policies of different types,
/// including boxed `dyn` policies.
pub trait PolicyMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short identifier of the replacement algorithm (e.g. "LRU", "FIFO").
    fn algorithm_name(&self) -> &'static str;

    /// Core counters of this policy and every policy it wraps, merged.
    fn core_counters(&self) -> CorePolicyMetrics;
}
