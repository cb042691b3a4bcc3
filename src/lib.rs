//! # coconut-policy
//!
//! Cache replacement policies built on an ordered eviction index.
//!
//! A cache owns its entries and a key to handle map; it hands every element to
//! a replacement policy, reports hits, and asks the policy which element to
//! give up when it needs room. This crate is that policy half:
//!
//! - [`IndexedList`]: a doubly linked list laid out as parallel arrays, where
//!   every element is named by an integer [`Handle`]. Add, remove, touch and
//!   evict are O(1); the arrays grow on demand and never shrink until `clear`.
//! - [`ReplacementPolicy`]: the operations a cache performs on its policy.
//! - Ordered policies ([`LruPolicy`], [`MruPolicy`], [`FifoPolicy`],
//!   [`LifoPolicy`]) that share one index and differ only in eviction end and
//!   touch handling.
//! - Decorators ([`decorator::PolicyDecorator`], [`decorator::FilteredPolicy`])
//!   that wrap a policy, for example to refuse elements by cost or size.
//!
//! ## Algorithm Selection Guide
//!
//! | Policy | Evicts | Good for |
//! |--------|--------|----------|
//! | [`LruPolicy`] | least recently touched | general purpose, temporal locality |
//! | [`MruPolicy`] | most recently touched | cyclic scans larger than the cache |
//! | [`FifoPolicy`] | oldest insertion | cheap, hit-insensitive workloads |
//! | [`LifoPolicy`] | newest insertion | keeping a stable warm set during bursts |
//!
//! ## Quick Start
//!
//! ```rust
//! use coconut_policy::attributes::AttributeMap;
//! use coconut_policy::{LruPolicy, ReplacementPolicy};
//! use std::collections::HashMap;
//!
//! let mut handles = HashMap::new();
//! let mut policy = LruPolicy::with_capacity(2);
//! let attrs = AttributeMap::new();
//!
//! for key in ["apple", "banana", "cherry"] {
//!     let handle = policy.add(key, &attrs).unwrap();
//!     handles.insert(key, handle);
//! }
//!
//! // A hit on "apple" protects it from the next eviction.
//! policy.touch(handles["apple"]);
//! let victim = policy.evict_next().unwrap();
//! handles.remove(victim);
//! assert_eq!(victim, "banana");
//! ```
//!
//! ## Building From Configuration
//!
//! ```rust
//! use coconut_policy::config::{PolicyConfig, PolicyKind};
//! use coconut_policy::PolicyMetrics;
//!
//! let policy = PolicyConfig::new(PolicyKind::Mru).build::<u64>().unwrap();
//! assert_eq!(policy.algorithm_name(), "MRU");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `std` | `std::error::Error` for [`error::ConfigError`] |
//! | `concurrent` | [`concurrent::ConcurrentPolicy`], a `parking_lot` lock wrapper (implies `std`) |
//!
//! The crate is `no_std` and needs only `alloc` by default.
//!
//! ## Modules
//!
//! - [`index`]: the ordered eviction index
//! - [`policy`]: the policy trait and the ordered policies
//! - [`decorator`]: policy wrappers and admission filters
//! - [`attributes`]: per-element attributes such as cost and size
//! - [`config`]: configuration structures and the policy builder
//! - [`error`]: configuration errors
//! - [`metrics`]: counters reported by every policy
//! - [`concurrent`]: thread-safe wrapper (requires `concurrent` feature)

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[cfg_attr(test, macro_use)]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Ordered eviction index.
///
/// An array-backed doubly linked list addressed by integer handles. This is
/// the data structure every ordered policy is built on.
pub mod index;

/// Per-element attribute bag consulted by filters.
pub mod attributes;

/// Replacement policy trait and the LRU, MRU, FIFO and LIFO policies.
pub mod policy;

/// Decorators that wrap a policy and alter or filter what reaches it.
pub mod decorator;

/// Policy configuration structures.
///
/// Provides plain configuration structs and a builder that turns them into a
/// boxed policy.
pub mod config;

/// Error types.
pub mod error;

/// Policy metrics system.
///
/// Every policy counts what happens to it and reports the counters as a
/// `BTreeMap<String, f64>` through the [`metrics::PolicyMetrics`] trait.
pub mod metrics;

/// Thread-safe policy wrapper.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use index::{Handle, IndexedList};
pub use policy::{FifoPolicy, LifoPolicy, LruPolicy, MruPolicy, ReplacementPolicy};

pub use attributes::AttributeMap;
pub use config::{FilterConfig, PolicyConfig, PolicyKind};
pub use error::ConfigError;
pub use metrics::PolicyMetrics;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentPolicy;
