//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Packed bit array
//! - Hash functions and the salt
//! - Parameter calculations
//! - Lock strategy
//! - Configuration
//! - Core Bloom filter
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bit_array;
pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub(crate) mod locking;
pub mod parameters;

pub use bit_array::BitArray;
pub use bloom_filter::BloomFilter;
pub use config::{BloomConfig, BloomConfigBuilder};
pub use hash_functions::{bit_positions, Murmur3Hasher, MultiHasher, Sip13Hasher, SALT};
pub use parameters::{calculate_fpr, calculate_optimal_parameters, estimate_parameters, BloomFilterParams};
