//! Error types.
//!
//! The eviction index and the policies never fail: bad handles are answered
//! with `None`/`false` and a full index grows. The only fallible step is turning
//! user-supplied configuration into a policy, which reports a [`ConfigError`].
//!
//! ```
//! use coconut_policy::config::{FilterConfig, PolicyConfig, PolicyKind};
//! use core::num::NonZeroUsize;
//!
//! let config = PolicyConfig {
//!     kind: PolicyKind::Lru,
//!     initial_capacity: NonZeroUsize::new(64).unwrap(),
//!     filter: FilterConfig {
//!         minimum_cost: Some(f64::NAN),
//!         maximum_size: None,
//!     },
//! };
//! let err = config.validate().unwrap_err();
//! assert!(err.to_string().contains("minimum_cost"));
//! ```

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// Error returned when policy configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
