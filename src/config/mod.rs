//! Policy Configuration Module
//!
//! Configuration structs have all public fields for simple instantiation:
//!
//! - **Simple**: create the struct with all fields set
//! - **Checked once**: [`PolicyConfig::validate`] rejects bad values up front
//! - **Type erased output**: [`PolicyConfig::build`] returns a boxed policy, so
//!   the algorithm can be chosen at run time
//!
//! | Config | Purpose |
//! |--------|---------|
//! | [`PolicyConfig`] | Algorithm, initial index capacity, admission filter |
//! | [`FilterConfig`] | Optional cost floor and size ceiling |
//! | [`PolicyKind`] | The ordered policy to build |
//!
//! # Examples
//!
//! ```
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::config::{FilterConfig, PolicyConfig, PolicyKind};
//! use coconut_policy::metrics::PolicyMetrics;
//! use coconut_policy::policy::ReplacementPolicy;
//! use core::num::NonZeroUsize;
//!
//! let config = PolicyConfig {
//!     kind: "fifo".parse().unwrap(),
//!     initial_capacity: NonZeroUsize::new(1000).unwrap(),
//!     filter: FilterConfig {
//!         minimum_cost: None,
//!         maximum_size: Some(64 * 1024),
//!     },
//! };
//!
//! let mut policy = config.build::<String>().unwrap();
//! assert_eq!(policy.algorithm_name(), "FIFO");
//! assert!(policy
//!     .add("too big".to_string(), &AttributeMap::new().with_size(1 << 20))
//!     .is_none());
//! ```

extern crate alloc;

use crate::decorator::{AllOf, FilteredPolicy, MaximumSizeFilter, MinimumCostFilter};
use crate::error::ConfigError;
use crate::index::DEFAULT_CAPACITY;
use crate::policy::{FifoPolicy, LifoPolicy, LruPolicy, MruPolicy, ReplacementPolicy};
use alloc::boxed::Box;
use alloc::format;
use core::fmt;
use core::num::NonZeroUsize;
use core::str::FromStr;

pub mod filter;

pub use filter::FilterConfig;

/// The ordered replacement policies that can be built from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PolicyKind {
    /// Least recently used
    #[default]
    Lru,
    /// Most recently used
    Mru,
    /// First in, first out
    Fifo,
    /// Last in, first out
    Lifo,
}

impl PolicyKind {
    /// Every buildable policy, in reporting order.
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Lru,
        PolicyKind::Mru,
        PolicyKind::Fifo,
        PolicyKind::Lifo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Mru => "MRU",
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lifo => "LIFO",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    /// Parses a policy name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PolicyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::new(format!("unknown replacement policy '{name}'")))
    }
}

/// Configuration for a replacement policy.
///
/// # Fields
///
/// - `kind`: Which ordered policy to build.
/// - `initial_capacity`: Slots allocated by the eviction index up front. The
///   index grows past this on demand and returns to it on `clear`.
/// - `filter`: Admission filter applied on `add` and `update`.
#[derive(Clone, Copy, PartialEq)]
pub struct PolicyConfig {
    /// Replacement algorithm
    pub kind: PolicyKind,
    /// Initial number of slots in the eviction index
    pub initial_capacity: NonZeroUsize,
    /// Cost/size admission filter
    pub filter: FilterConfig,
}

impl PolicyConfig {
    /// An unfiltered policy of `kind` with the default initial capacity.
    pub fn new(kind: PolicyKind) -> Self {
        PolicyConfig {
            kind,
            initial_capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            filter: FilterConfig::default(),
        }
    }

    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()
    }

    /// Validates the configuration and builds the policy it describes.
    ///
    /// The policy is wrapped in a [`FilteredPolicy`] only when the filter
    /// configuration sets a bound.
    pub fn build<T: 'static>(&self) -> Result<Box<dyn ReplacementPolicy<T>>, ConfigError> {
        self.validate()?;
        let capacity = self.initial_capacity;
        Ok(match self.kind {
            PolicyKind::Lru => self.wrap(LruPolicy::new(capacity)),
            PolicyKind::Mru => self.wrap(MruPolicy::new(capacity)),
            PolicyKind::Fifo => self.wrap(FifoPolicy::new(capacity)),
            PolicyKind::Lifo => self.wrap(LifoPolicy::new(capacity)),
        })
    }

    /// Like [`build`](Self::build) for element types that can cross threads.
    pub fn build_send<T: Send + 'static>(
        &self,
    ) -> Result<Box<dyn ReplacementPolicy<T> + Send>, ConfigError> {
        self.validate()?;
        let capacity = self.initial_capacity;
        Ok(match self.kind {
            PolicyKind::Lru => self.wrap_send(LruPolicy::new(capacity)),
            PolicyKind::Mru => self.wrap_send(MruPolicy::new(capacity)),
            PolicyKind::Fifo => self.wrap_send(FifoPolicy::new(capacity)),
            PolicyKind::Lifo => self.wrap_send(LifoPolicy::new(capacity)),
        })
    }

    fn filter_of(&self) -> AllOf<MinimumCostFilter, MaximumSizeFilter> {
        AllOf(
            MinimumCostFilter::new(self.filter.minimum_cost.unwrap_or(f64::NEG_INFINITY)),
            MaximumSizeFilter::new(self.filter.maximum_size.unwrap_or(u64::MAX)),
        )
    }

    fn wrap<T, P>(&self, policy: P) -> Box<dyn ReplacementPolicy<T>>
    where
        P: ReplacementPolicy<T> + 'static,
    {
        if self.filter.is_unbounded() {
            Box::new(policy)
        } else {
            Box::new(FilteredPolicy::new(policy, self.filter_of()))
        }
    }

    fn wrap_send<T, P>(&self, policy: P) -> Box<dyn ReplacementPolicy<T> + Send>
    where
        P: ReplacementPolicy<T> + Send + 'static,
    {
        if self.filter.is_unbounded() {
            Box::new(policy)
        } else {
            Box::new(FilteredPolicy::new(policy, self.filter_of()))
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::new(PolicyKind::default())
    }
}

impl fmt::Debug for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyConfig")
            .field("kind", &self.kind)
            .field("initial_capacity", &self.initial_capacity)
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::metrics::PolicyMetrics;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("lru".parse::<PolicyKind>(), Ok(PolicyKind::Lru));
        assert_eq!(" MRU ".parse::<PolicyKind>(), Ok(PolicyKind::Mru));
        assert_eq!("Fifo".parse::<PolicyKind>(), Ok(PolicyKind::Fifo));
        assert_eq!("lifo".parse::<PolicyKind>(), Ok(PolicyKind::Lifo));

        let err = "clock".parse::<PolicyKind>().unwrap_err();
        assert!(err.message().contains("clock"));
    }

    #[test]
    fn test_build_every_kind() {
        for kind in PolicyKind::ALL {
            let policy = PolicyConfig::new(kind).build::<u32>().unwrap();
            assert_eq!(policy.algorithm_name(), kind.as_str());
            assert_eq!(policy.algorithm_name(), kind.to_string());
        }
    }

    #[test]
    fn test_build_applies_filter() {
        let config = PolicyConfig {
            kind: PolicyKind::Lru,
            initial_capacity: NonZeroUsize::new(2).unwrap(),
            filter: FilterConfig {
                minimum_cost: Some(2.0),
                maximum_size: Some(100),
            },
        };
        let mut policy = config.build::<&'static str>().unwrap();

        assert!(policy.add("cheap", &AttributeMap::new()).is_none());
        assert!(policy
            .add("big", &AttributeMap::new().with_cost(3.0).with_size(101))
            .is_none());
        assert!(policy
            .add("ok", &AttributeMap::new().with_cost(3.0).with_size(100))
            .is_some());
        assert_eq!(policy.peek_all(), vec![&"ok"]);
        assert_eq!(policy.metrics()["rejections"], 2.0);
    }

    #[test]
    fn test_build_rejects_invalid_filter() {
        let mut config = PolicyConfig::new(PolicyKind::Fifo);
        config.filter.maximum_size = Some(0);
        assert!(config.build::<u8>().is_err());
        assert!(config.build_send::<u8>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PolicyConfig::default();
        assert_eq!(config.kind, PolicyKind::Lru);
        assert_eq!(config.initial_capacity.get(), DEFAULT_CAPACITY);
        assert!(config.filter.is_unbounded());
        assert!(config.validate().is_ok());
    }
}
