//! Per-element attribute bag.
//!
//! Policies and filters that weigh elements by cost or size read them from an
//! [`AttributeMap`] supplied alongside the element at `add`/`update` time. The
//! eviction index itself never stores or interprets attributes.
//!
//! Keys are plain strings. Two are well known and have typed accessors:
//!
//! | Key | Accessor | Default when absent |
//! |-----|----------|---------------------|
//! | `"cost"` | [`AttributeMap::cost`] | [`DEFAULT_COST`] |
//! | `"size"` | [`AttributeMap::size`] | [`DEFAULT_SIZE`] |

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Attribute key holding the cost of (re)creating an element.
pub const COST: &str = "cost";

/// Attribute key holding the size of an element.
pub const SIZE: &str = "size";

/// Cost assumed for elements that carry no `"cost"` attribute.
pub const DEFAULT_COST: f64 = 1.0;

/// Size assumed for elements that carry no `"size"` attribute.
pub const DEFAULT_SIZE: u64 = 1;

/// String-keyed numeric attributes attached to a cache element.
///
/// # Examples
///
/// ```
/// use coconut_policy::attributes::AttributeMap;
///
/// let attrs = AttributeMap::new().with_cost(2.5).with_size(4096);
/// assert_eq!(attrs.cost(), 2.5);
/// assert_eq!(attrs.size(), 4096);
///
/// // Absent attributes fall back to their defaults
/// assert_eq!(AttributeMap::new().cost(), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    values: BTreeMap<String, f64>,
}

impl AttributeMap {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_cost(self, cost: f64) -> Self {
        self.with(COST, cost)
    }

    /// Stores `size` as an `f64`; sizes above 2^53 read back rounded.
    pub fn with_size(self, size: u64) -> Self {
        self.with(SIZE, size as f64)
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn set(&mut self, key: &str, value: f64) -> Option<f64> {
        self.values.insert(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The element's cost, or [`DEFAULT_COST`] when unset.
    pub fn cost(&self) -> f64 {
        self.get(COST).unwrap_or(DEFAULT_COST)
    }

    /// The element's size, or [`DEFAULT_SIZE`] when unset.
    ///
    /// NaN and negative stored values read as zero. Values at or beyond
    /// `u64::MAX`, including positive infinity, read as `u64::MAX`. Fractional
    /// values are truncated. Sizes are stored as `f64`, so values above 2^53
    /// lose precision.
    pub fn size(&self) -> u64 {
        match self.get(SIZE) {
            Some(size) if size.is_nan() || size <= 0.0 => 0,
            Some(size) if size >= u64::MAX as f64 => u64::MAX,
            Some(size) => size as u64,
            None => DEFAULT_SIZE,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
