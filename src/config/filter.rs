//! Configuration for the admission filter applied in front of a policy.
//!
//! Both bounds are optional; a config with neither set builds an unfiltered
//! policy.
//!
//! - **`minimum_cost`**: elements cheaper than this to recreate are not worth
//!   caching. Compared against the `"cost"` attribute (default 1.0).
//! - **`maximum_size`**: elements larger than this would displace too much of
//!   the cache. Compared against the `"size"` attribute (default 1).

extern crate alloc;

use crate::error::ConfigError;
use alloc::format;
use core::fmt;

/// Cost floor and size ceiling for admission.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct FilterConfig {
    /// Elements with a lower cost are rejected. Must be finite and non-negative.
    pub minimum_cost: Option<f64>,
    /// Elements with a larger size are rejected. Must be non-zero.
    pub maximum_size: Option<u64>,
}

impl FilterConfig {
    /// Returns `true` when no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.minimum_cost.is_none() && self.maximum_size.is_none()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cost) = self.minimum_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ConfigError::new(format!(
                    "minimum_cost must be finite and non-negative, got {cost}"
                )));
            }
        }
        if self.maximum_size == Some(0) {
            return Err(ConfigError::new("maximum_size must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("minimum_cost", &self.minimum_cost)
            .field("maximum_size", &self.maximum_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_config_validation() {
        assert!(FilterConfig::default().validate().is_ok());

        let negative = FilterConfig {
            minimum_cost: Some(-1.0),
            maximum_size: None,
        };
        assert!(negative.validate().is_err());

        let infinite = FilterConfig {
            minimum_cost: Some(f64::INFINITY),
            maximum_size: None,
        };
        assert!(infinite.validate().is_err());

        let zero_size = FilterConfig {
            minimum_cost: None,
            maximum_size: Some(0),
        };
        assert!(zero_size.validate().is_err());

        let ok = FilterConfig {
            minimum_cost: Some(0.0),
            maximum_size: Some(1),
        };
        assert!(ok.validate().is_ok());
        assert!(!ok.is_unbounded());
    }
}
