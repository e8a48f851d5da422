//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```
//! use bloom_filter::{BloomConfigBuilder, BloomFilter};
//!
//! let config = BloomConfigBuilder::new()
//!     .expected_elements(10_000)
//!     .target_fpr(0.001)
//!     .thread_safe(true)
//!     .build()
//!     .expect("valid config");
//!
//! let filter: BloomFilter = BloomFilter::from_config(&config).unwrap();
//! assert!(filter.is_thread_safe());
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{calculate_optimal_parameters, BloomFilterParams};
use crate::error::FilterError;

/// Default expected element count
pub const DEFAULT_EXPECTED_ELEMENTS: u64 = 1_000;

/// Default target false positive rate
pub const DEFAULT_TARGET_FPR: f64 = 0.01;

/// Bloom filter configuration
///
/// Sizing inputs plus the locking choice, fixed before construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Expected number of elements (n), must be > 0
    pub expected_elements: u64,
    /// Target false positive rate (p), strictly between 0 and 1
    pub target_fpr: f64,
    /// Guard every operation with an internal read/write lock
    pub thread_safe: bool,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            target_fpr: DEFAULT_TARGET_FPR,
            thread_safe: false,
        }
    }
}

impl BloomConfig {
    /// Create a new configuration with validation
    pub fn new(expected_elements: u64, target_fpr: f64, thread_safe: bool) -> Result<Self, FilterError> {
        let config = Self {
            expected_elements,
            target_fpr,
            thread_safe,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject inputs the sizing formulas are undefined for
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.expected_elements == 0 {
            return Err(FilterError::InvalidParameters(
                "expected_elements cannot be 0".to_string(),
            ));
        }

        if !(self.target_fpr > 0.0 && self.target_fpr < 1.0) {
            return Err(FilterError::InvalidFpr {
                fpr: self.target_fpr,
            });
        }

        Ok(())
    }

    /// Filter size and hash count for this configuration
    pub fn parameters(&self) -> Result<BloomFilterParams, FilterError> {
        self.validate()?;
        calculate_optimal_parameters(self.expected_elements, self.target_fpr)
    }
}

/// Builder for BloomConfig with validation
///
/// Unset fields fall back to [`BloomConfig::default`].
#[derive(Default)]
pub struct BloomConfigBuilder {
    expected_elements: Option<u64>,
    target_fpr: Option<f64>,
    thread_safe: Option<bool>,
}

impl BloomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set expected number of elements
    pub fn expected_elements(mut self, n: u64) -> Self {
        self.expected_elements = Some(n);
        self
    }

    /// Set target false positive rate
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    /// Enable or disable the internal read/write lock
    pub fn thread_safe(mut self, enabled: bool) -> Self {
        self.thread_safe = Some(enabled);
        self
    }

    /// Build the BloomConfig, validating all parameters
    pub fn build(self) -> Result<BloomConfig, FilterError> {
        let defaults = BloomConfig::default();

        let config = BloomConfig {
            expected_elements: self.expected_elements.unwrap_or(defaults.expected_elements),
            target_fpr: self.target_fpr.unwrap_or(defaults.target_fpr),
            thread_safe: self.thread_safe.unwrap_or(defaults.thread_safe),
        };

        config.validate()?;
        Ok(config)
    }
}
