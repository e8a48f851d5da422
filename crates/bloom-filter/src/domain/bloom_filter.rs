//! Core Bloom Filter implementation
//!
//! INVARIANTS:
//! - `m >= 1` and `k >= 1` for every constructed filter
//! - No false negatives: once `add(v)` returns, `contains(v)` is true
//! - Monotonic: no operation ever unsets a bit, so once `contains(v)` is
//!   true it stays true for the filter's lifetime

use std::fmt;

use tracing::debug;

use super::bit_array::BitArray;
use super::config::BloomConfig;
use super::hash_functions::{bit_positions, Murmur3Hasher, MultiHasher};
use super::locking::LockStrategy;
use super::parameters;
use crate::codec;
use crate::error::FilterError;

/// Bloom filter for probabilistic membership testing
///
/// False positives are possible, false negatives are not. Elements cannot
/// be removed and the filter never grows.
///
/// Every operation takes `&self`. With `thread_safe = true` an internal
/// read/write lock makes each `add` atomic with respect to other calls, so
/// the filter can be shared behind an `Arc`. Without it the bit writes are
/// still memory-safe, but a `contains` racing an `add` of the same value may
/// observe the insertion half-done; callers serialize access themselves.
pub struct BloomFilter<H: MultiHasher = Murmur3Hasher> {
    /// Size in bits (m)
    m: u64,
    /// Number of hash functions (k)
    k: u64,
    /// Bit array storing the filter state
    bits: BitArray,
    lock: LockStrategy,
    hasher: H,
}

impl BloomFilter<Murmur3Hasher> {
    /// Create an empty filter with `m` bits and `k` hash functions
    ///
    /// # Arguments
    /// * `m` - Size in bits, must be > 0
    /// * `k` - Number of hash functions, must be > 0
    /// * `thread_safe` - Guard every operation with an internal read/write lock
    pub fn new(m: u64, k: u64, thread_safe: bool) -> Result<Self, FilterError> {
        Self::with_hasher(m, k, thread_safe, Murmur3Hasher)
    }

    /// Create an unsynchronized filter sized for `n` elements at rate `p`
    pub fn new_with_estimates(n: u64, p: f64) -> Result<Self, FilterError> {
        let (m, k) = Self::estimate_parameters(n, p)?;
        Self::new(m, k, false)
    }

    /// Create a filter from a validated configuration
    pub fn from_config(config: &BloomConfig) -> Result<Self, FilterError> {
        let params = config.parameters()?;
        Self::new(params.size_bits, params.hash_count, config.thread_safe)
    }

    /// Rebuild a filter from bytes produced by [`BloomFilter::export_data`]
    pub fn import_data(bytes: &[u8], thread_safe: bool) -> Result<Self, FilterError> {
        Self::import_data_with_hasher(bytes, thread_safe, Murmur3Hasher)
    }

    /// Optimal `(m, k)` for `n` expected elements at false positive rate `p`
    ///
    /// Both values are rounded up; see [`parameters::estimate_parameters`].
    pub fn estimate_parameters(n: u64, p: f64) -> Result<(u64, u64), FilterError> {
        parameters::estimate_parameters(n, p)
    }
}

impl<H: MultiHasher> BloomFilter<H> {
    /// Create an empty filter using a custom hash strategy
    pub fn with_hasher(m: u64, k: u64, thread_safe: bool, hasher: H) -> Result<Self, FilterError> {
        validate_shape(m, k)?;
        debug!(m, k, thread_safe, "Creating bloom filter");

        Ok(Self {
            m,
            k,
            bits: BitArray::new(m),
            lock: LockStrategy::new(thread_safe),
            hasher,
        })
    }

    /// Rebuild a filter from exported bytes using a custom hash strategy
    ///
    /// The hasher must be the one the data was produced with; nothing in the
    /// format records it.
    pub fn import_data_with_hasher(
        bytes: &[u8],
        thread_safe: bool,
        hasher: H,
    ) -> Result<Self, FilterError> {
        let (m, k, bits) = codec::decode(bytes)?;
        debug!(m, k, thread_safe, len = bytes.len(), "Imported bloom filter");

        Ok(Self {
            m,
            k,
            bits,
            lock: LockStrategy::new(thread_safe),
            hasher,
        })
    }

    /// Insert a value
    ///
    /// After insertion, `contains(value)` is guaranteed to return true.
    pub fn add(&self, value: impl AsRef<[u8]>) {
        let _guard = self.lock.write();
        for pos in bit_positions(&self.hasher, value.as_ref(), self.k, self.m) {
            self.bits.set(pos);
        }
    }

    /// Test if a value might be in the filter
    ///
    /// Returns:
    /// - `true` if the value might be in the set (could be false positive)
    /// - `false` if the value is definitely NOT in the set
    pub fn contains(&self, value: impl AsRef<[u8]>) -> bool {
        let _guard = self.lock.read();
        bit_positions(&self.hasher, value.as_ref(), self.k, self.m).all(|pos| self.bits.is_set(pos))
    }

    /// Serialize as `m` (u64 LE), `k` (u64 LE), then the bit array words
    pub fn export_data(&self) -> Vec<u8> {
        let _guard = self.lock.write();
        codec::encode(self.m, self.k, &self.bits)
    }

    /// Merge another filter into this one (OR operation)
    ///
    /// Both filters must have the same `m` and `k` and use the same hasher.
    /// `other` is snapshotted under its own lock before `self` is locked, so
    /// two filters merging into each other cannot deadlock.
    pub fn merge(&self, other: &BloomFilter<H>) -> Result<(), FilterError> {
        if self.m != other.m || self.k != other.k {
            return Err(FilterError::IncompatibleFilters {
                left_m: self.m,
                left_k: self.k,
                right_m: other.m,
                right_k: other.k,
            });
        }
        if std::ptr::eq(self, other) {
            return Ok(());
        }

        let snapshot = {
            let _guard = other.lock.read();
            other.bits.clone()
        };
        let _guard = self.lock.write();
        self.bits.union_with(&snapshot);
        debug!(m = self.m, k = self.k, "Merged bloom filter");
        Ok(())
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> u64 {
        self.m
    }

    /// Get the number of hash functions
    pub fn hash_count(&self) -> u64 {
        self.k
    }

    pub fn is_thread_safe(&self) -> bool {
        self.lock.is_thread_safe()
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> u64 {
        let _guard = self.lock.read();
        self.bits.count_ones()
    }

    /// True if no bit is set (nothing added, imported or merged in)
    pub fn is_empty(&self) -> bool {
        self.bits_set() == 0
    }

    /// Current false positive probability estimated from the fill ratio
    ///
    /// Formula: FPR = (X / m)^k where X is the number of set bits
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill = self.bits_set() as f64 / self.m as f64;
        fill.powf(self.k as f64)
    }

    /// Estimated number of distinct values added
    ///
    /// Formula: n* = -(m / k) * ln(1 - X / m). Infinite once every bit is set.
    pub fn estimated_len(&self) -> f64 {
        let m = self.m as f64;
        let x = self.bits_set() as f64;
        -(m / self.k as f64) * (1.0 - x / m).ln()
    }
}

impl<H: MultiHasher + Clone> Clone for BloomFilter<H> {
    fn clone(&self) -> Self {
        let bits = {
            let _guard = self.lock.read();
            self.bits.clone()
        };
        Self {
            m: self.m,
            k: self.k,
            bits,
            lock: LockStrategy::new(self.lock.is_thread_safe()),
            hasher: self.hasher.clone(),
        }
    }
}

impl<H: MultiHasher> fmt::Debug for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("m", &self.m)
            .field("k", &self.k)
            .field("thread_safe", &self.is_thread_safe())
            .field("bits_set", &self.bits_set())
            .finish()
    }
}

pub(crate) fn validate_shape(m: u64, k: u64) -> Result<(), FilterError> {
    if m == 0 {
        return Err(FilterError::InvalidParameters(
            "filter size m cannot be 0".to_string(),
        ));
    }
    if k == 0 {
        return Err(FilterError::InvalidParameters(
            "hash count k cannot be 0".to_string(),
        ));
    }
    Ok(())
}
