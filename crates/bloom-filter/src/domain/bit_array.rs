//! Packed bit array
//!
//! Fixed-capacity array of bits stored in 64-bit words. Bit `i` lives in
//! word `i / 64` at offset `i % 64`, counted from the least significant bit
//! (`bitvec`'s `Lsb0` order over `u64` words).
//!
//! Words are atomics so single-bit writes only need `&self`. Grouping several
//! writes into one atomic step is the owner's job (see `LockStrategy`).
//!
//! INVARIANTS:
//! - `bits.len() == capacity` and the raw store holds `ceil(capacity / 64)` words
//! - bits at positions `>= capacity` in the last word are always zero

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

use crate::error::FilterError;

/// Width of one storage word in bits
pub const WORD_BITS: u64 = u64::BITS as u64;

/// Width of one storage word in bytes
pub const WORD_BYTES: usize = std::mem::size_of::<u64>();

/// Fixed-size array of bits packed into 64-bit words
#[derive(Clone, PartialEq, Eq)]
pub struct BitArray {
    /// Number of addressable bits
    capacity: u64,
    /// Storage, `ceil(capacity / 64)` atomic words
    bits: BitVec<AtomicU64, Lsb0>,
}

/// Number of words needed to hold `capacity` bits
pub fn word_count(capacity: u64) -> usize {
    capacity.div_ceil(WORD_BITS) as usize
}

/// Number of bytes `export_bytes` produces for `capacity` bits
pub fn byte_len(capacity: u64) -> usize {
    word_count(capacity) * WORD_BYTES
}

impl BitArray {
    /// Create an array of `capacity` bits, all zero
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            bits: BitVec::repeat(false, capacity as usize),
        }
    }

    /// Rebuild an array from bytes produced by [`BitArray::export_bytes`]
    ///
    /// The capacity is supplied by the caller; `bytes` must hold exactly
    /// `ceil(capacity / 64)` little-endian words. Bits beyond `capacity` in
    /// the last word are dropped.
    pub fn import_bytes(capacity: u64, bytes: &[u8]) -> Result<Self, FilterError> {
        let expected = byte_len(capacity);
        if bytes.len() < expected {
            return Err(FilterError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(FilterError::TrailingBytes {
                expected,
                actual: bytes.len(),
            });
        }

        let mut words: Vec<AtomicU64> = bytes
            .chunks_exact(WORD_BYTES)
            .map(|chunk| {
                let mut word = [0u8; WORD_BYTES];
                word.copy_from_slice(chunk);
                AtomicU64::new(u64::from_le_bytes(word))
            })
            .collect();

        let tail = capacity % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last.get_mut() &= (1u64 << tail) - 1;
            }
        }

        let mut bits = BitVec::from_vec(words);
        bits.truncate(capacity as usize);
        Ok(Self { capacity, bits })
    }

    /// Set bit `index` to 1
    ///
    /// # Panics
    /// Panics if `index >= capacity`.
    pub fn set(&self, index: u64) {
        let index = self.locate(index);
        self.bits.set_aliased(index, true);
    }

    /// Whether bit `index` is 1
    ///
    /// # Panics
    /// Panics if `index >= capacity`.
    pub fn is_set(&self, index: u64) -> bool {
        self.bits[self.locate(index)]
    }

    /// Serialize the words in order, each as 8 little-endian bytes
    pub fn export_bytes(&self) -> Vec<u8> {
        let words = self.bits.as_raw_slice();
        let mut out = Vec::with_capacity(words.len() * WORD_BYTES);
        for word in words {
            out.extend_from_slice(&word.load(Ordering::Relaxed).to_le_bytes());
        }
        out
    }

    /// Number of addressable bits
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of storage words
    pub fn word_count(&self) -> usize {
        self.bits.as_raw_slice().len()
    }

    /// Number of bits set to 1
    pub fn count_ones(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    /// OR every word of `other` into `self`
    ///
    /// # Panics
    /// Panics if the capacities differ.
    pub fn union_with(&self, other: &BitArray) {
        assert_eq!(
            self.capacity, other.capacity,
            "Cannot union bit arrays with different capacities"
        );
        let src = other.bits.as_raw_slice();
        for (dst, src) in self.bits.as_raw_slice().iter().zip(src) {
            dst.fetch_or(src.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    fn locate(&self, index: u64) -> usize {
        assert!(
            index < self.capacity,
            "bit index {} out of range for capacity {}",
            index,
            self.capacity
        );
        index as usize
    }
}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitArray")
            .field("capacity", &self.capacity)
            .field("ones", &self.count_ones())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_all_zero() {
        let bits = BitArray::new(130);

        assert_eq!(bits.capacity(), 130);
        assert_eq!(bits.word_count(), 3, "130 bits need 3 words");
        assert_eq!(bits.count_ones(), 0);
        assert!((0..130).all(|i| !bits.is_set(i)));
    }

    #[test]
    fn test_set_and_is_set() {
        let bits = BitArray::new(200);
        for i in [0u64, 1, 63, 64, 65, 127, 128, 199] {
            bits.set(i);
            assert!(bits.is_set(i), "bit {} should be set", i);
        }
        assert_eq!(bits.count_ones(), 8);
        assert!(!bits.is_set(2));
        assert!(!bits.is_set(198));
    }

    #[test]
    fn test_set_is_idempotent() {
        let bits = BitArray::new(64);
        bits.set(10);
        bits.set(10);
        assert_eq!(bits.count_ones(), 1);
    }

    #[test]
    fn test_shared_sets_from_many_threads() {
        // Neighbouring bits of the same words written through `&self`
        let bits = BitArray::new(256);
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let bits = &bits;
                s.spawn(move || {
                    for i in (t..256).step_by(4) {
                        bits.set(i);
                    }
                });
            }
        });

        assert_eq!(bits.count_ones(), 256);
        assert_eq!(bits.export_bytes(), vec![0xFF; 32]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        let bits = BitArray::new(100);
        bits.set(100);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_is_set_out_of_range_panics() {
        let bits = BitArray::new(64);
        bits.is_set(64);
    }

    #[test]
    fn test_layout_matches_lsb0_words() {
        // Same bits through bitvec's Lsb0 u64 storage must give identical words
        let capacity = 300u64;
        let ours = BitArray::new(capacity);
        let mut reference = BitVec::<u64, Lsb0>::repeat(false, capacity as usize);

        for i in (0..capacity).filter(|i| i % 7 == 3 || i % 11 == 0) {
            ours.set(i);
            reference.set(i as usize, true);
        }

        let expected: Vec<u8> = reference
            .as_raw_slice()
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        assert_eq!(ours.export_bytes(), expected);
    }

    #[test]
    fn test_export_is_little_endian() {
        let bits = BitArray::new(72);
        bits.set(0);
        bits.set(9);
        bits.set(64);

        let bytes = bits.export_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0b0000_0001);
        assert_eq!(bytes[1], 0b0000_0010);
        assert_eq!(bytes[8], 0b0000_0001);
    }

    #[test]
    fn test_import_restores_state() {
        let bits = BitArray::new(150);
        for i in [3u64, 70, 149] {
            bits.set(i);
        }

        let restored = BitArray::import_bytes(150, &bits.export_bytes()).unwrap();
        assert_eq!(restored, bits);
        assert!(restored.is_set(149));
        assert!(!restored.is_set(148));
    }

    #[test]
    fn test_import_rejects_wrong_length() {
        let short = BitArray::import_bytes(128, &[0u8; 15]);
        assert_eq!(
            short,
            Err(FilterError::Truncated {
                expected: 16,
                actual: 15
            })
        );

        let long = BitArray::import_bytes(64, &[0u8; 9]);
        assert_eq!(
            long,
            Err(FilterError::TrailingBytes {
                expected: 8,
                actual: 9
            })
        );
    }

    #[test]
    fn test_import_masks_bits_beyond_capacity() {
        let bytes = [0xFFu8; 8];
        let bits = BitArray::import_bytes(10, &bytes).unwrap();

        assert_eq!(bits.count_ones(), 10);
        assert_eq!(bits.export_bytes(), vec![0xFF, 0x03, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_union_only_adds_bits() {
        let a = BitArray::new(128);
        let b = BitArray::new(128);
        a.set(1);
        b.set(100);

        a.union_with(&b);
        assert!(a.is_set(1) && a.is_set(100));
        assert_eq!(a.count_ones(), 2);
        assert!(!b.is_set(1), "union must not modify the source");

        // Union with an empty array keeps every bit
        a.union_with(&BitArray::new(128));
        assert!(a.is_set(1) && a.is_set(100));
    }

    #[test]
    fn test_clone_is_independent() {
        let a = BitArray::new(64);
        a.set(5);
        let b = a.clone();
        a.set(6);

        assert!(b.is_set(5));
        assert!(!b.is_set(6));
    }

    #[test]
    #[should_panic(expected = "different capacities")]
    fn test_union_capacity_mismatch_panics() {
        BitArray::new(64).union_with(&BitArray::new(65));
    }
}
