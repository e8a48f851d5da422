//! Hash functions for the Bloom filter
//!
//! Every value is hashed as `SALT || value`. One 128-bit digest is split into
//! two 64-bit halves `h1`, `h2` and the `k` outputs are derived by double
//! hashing: `g(i) = h1 + i * h2`.
//!
//! MurmurHash3 (x64, 128-bit) is the default, SipHash-1-3 is available as a
//! drop-in alternative.

use std::hash::Hasher;
use std::io::{Cursor, Read};

use siphasher::sip128::{Hasher128, SipHasher13};

/// Prefix mixed into every hashed value
///
/// Keeps this filter's positions apart from other uses of the same hash
/// function in a process. The separation it buys is a property of the pair
/// (salt, hash function): when a different [`MultiHasher`] is plugged in,
/// the salt stays but its decorrelation has to be re-checked for that
/// function. Changing either one changes every bit position, so filters
/// exported under one pair cannot be read under another.
pub const SALT: &[u8] = b"g9hmj2fhgr";

/// Source of `k` hash values per input
///
/// Implementors provide one 128-bit digest of the salted value. By default
/// the `k` outputs are derived from its two halves; a hasher with a native
/// k-output function overrides [`MultiHasher::hash_values`] instead, and the
/// filter uses whatever it yields.
pub trait MultiHasher: Default + Send + Sync {
    /// Two 64-bit halves of the digest of `SALT || value`
    fn hash_pair(&self, value: &[u8]) -> (u64, u64);

    /// `k` hash values for `value`, produced lazily
    ///
    /// Must yield exactly `k` values and be deterministic for a given input.
    fn hash_values(&self, value: &[u8], k: u64) -> impl Iterator<Item = u64> {
        let (h1, h2) = self.hash_pair(value);
        (0..k).map(move |i| double_hash(h1, h2, i))
    }
}

/// MurmurHash3 x64_128 with seed 0
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3Hasher;

impl MultiHasher for Murmur3Hasher {
    fn hash_pair(&self, value: &[u8]) -> (u64, u64) {
        let mut salted = Cursor::new(SALT).chain(value);
        // Reading from in-memory slices cannot fail
        let hash = murmur3::murmur3_x64_128(&mut salted, 0).unwrap_or(0);
        (hash as u64, (hash >> 64) as u64)
    }
}

/// SipHash-1-3, 128-bit output, zero keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sip13Hasher;

impl MultiHasher for Sip13Hasher {
    fn hash_pair(&self, value: &[u8]) -> (u64, u64) {
        let mut hasher = SipHasher13::new();
        hasher.write(SALT);
        hasher.write(value);
        let hash = hasher.finish128();
        (hash.h1, hash.h2)
    }
}

#[inline]
fn double_hash(h1: u64, h2: u64, i: u64) -> u64 {
    h1.wrapping_add(i.wrapping_mul(h2))
}

/// The `k` bit positions of `value` in a filter of `m` bits
///
/// Each output of [`MultiHasher::hash_values`] reduced modulo `m`. Lazy, so
/// membership checks can stop at the first unset bit.
pub fn bit_positions<'a, H: MultiHasher>(
    hasher: &'a H,
    value: &'a [u8],
    k: u64,
    m: u64,
) -> impl Iterator<Item = u64> + 'a {
    hasher.hash_values(value, k).take(k as usize).map(move |h| h % m)
}
