//! # Bloom Filter
//!
//! Probabilistic set membership over a fixed-size packed bit array.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `BitArray`: Packed bits in 64-bit words
//!   - `BloomFilter`: Insertion, membership, merge, statistics
//!   - `MultiHasher`: Salted 128-bit hash expanded to `k` values
//!   - Internal lock strategy: no-op or read/write lock, chosen at construction
//!   - `BloomConfig` / `BloomConfigBuilder`: Sizing inputs with validation
//!
//! - **Codec** (`codec`): The fixed little-endian export format and the
//!   serde bridge built on it
//!
//! ## Invariants
//!
//! - **No false negatives**: if added, `contains()` MUST return true
//! - **Monotonic**: no operation can unset a bit; a positive answer stays positive
//! - **FPR**: after `n` insertions, FPR ≈ (1 - e^(-kn/m))^k
//!
//! ## Usage Example
//!
//! ```
//! use bloom_filter::BloomFilter;
//!
//! let filter = BloomFilter::new_with_estimates(1_000, 0.01)?;
//! filter.add("0xABCD");
//! assert!(filter.contains("0xABCD"));
//!
//! let bytes = filter.export_data();
//! let restored = BloomFilter::import_data(&bytes, true)?;
//! assert!(restored.contains("0xABCD"));
//! # Ok::<(), bloom_filter::FilterError>(())
//! ```

pub mod codec;
pub mod domain;
pub mod error;

// Re-exports for convenience
pub use domain::{
    estimate_parameters, BitArray, BloomConfig, BloomConfigBuilder, BloomFilter,
    BloomFilterParams, Murmur3Hasher, MultiHasher, Sip13Hasher, SALT,
};
pub use error::FilterError;
