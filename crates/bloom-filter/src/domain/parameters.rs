//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(-n * ln(p) / (ln(2)^2))  -- bits
//! - k = ceil(ln(2) * m / n)           -- hash functions
//! - FPR = (1 - e^(-kn/m))^k
//!
//! Both `m` and `k` round up, so `m` is never below the real-valued optimum.
//! Taking `k` past its optimum can leave the expected FPR a few percent above
//! `p`.

use std::f64::consts::LN_2;

use crate::error::FilterError;

/// Bloom filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: u64,
    /// Number of hash functions (k)
    pub hash_count: u64,
    /// Expected false positive rate once `n` elements are inserted
    pub expected_fpr: f64,
}

/// Estimate `(m, k)` for `n` expected elements at false positive rate `p`
///
/// Rejects `n == 0` and any `p` outside the open interval `(0, 1)`.
pub fn estimate_parameters(n: u64, p: f64) -> Result<(u64, u64), FilterError> {
    if n == 0 {
        return Err(FilterError::InvalidParameters(
            "expected element count cannot be 0".to_string(),
        ));
    }
    // Also catches NaN
    if !(p > 0.0 && p < 1.0) {
        return Err(FilterError::InvalidFpr { fpr: p });
    }

    let n = n as f64;
    let m = (-n * p.ln() / (LN_2 * LN_2)).ceil();
    if !m.is_finite() || m >= u64::MAX as f64 {
        return Err(FilterError::InvalidParameters(format!(
            "filter for n={} at p={} does not fit in 64-bit addressing",
            n, p
        )));
    }
    let k = (LN_2 * m / n).ceil();

    Ok((m as u64, k as u64))
}

/// Estimate parameters together with the FPR they achieve at `n` elements
pub fn calculate_optimal_parameters(
    num_elements: u64,
    target_fpr: f64,
) -> Result<BloomFilterParams, FilterError> {
    let (size_bits, hash_count) = estimate_parameters(num_elements, target_fpr)?;

    Ok(BloomFilterParams {
        size_bits,
        hash_count,
        expected_fpr: calculate_fpr(size_bits, num_elements, hash_count),
    })
}

/// False positive rate for `n` elements in `m` bits with `k` hashes
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: u64, n: u64, k: u64) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powf(k as f64)
}
