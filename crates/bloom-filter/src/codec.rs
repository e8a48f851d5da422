//! Binary export format
//!
//! ```text
//! offset 0..8   : m (u64 LE)  bit array capacity
//! offset 8..16  : k (u64 LE)  hash count
//! offset 16..   : ceil(m / 64) words, each u64 LE
//! ```
//!
//! The buffer must match this layout exactly. Shorter buffers are
//! `Truncated`, longer ones `TrailingBytes`, and a header with `m == 0` or
//! `k == 0` is rejected before anything is allocated.
//!
//! `BloomFilter` also implements serde's traits as this byte sequence, so it
//! can be embedded in bincode or JSON documents.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::domain::bit_array::{BitArray, WORD_BITS, WORD_BYTES};
use crate::domain::bloom_filter::{validate_shape, BloomFilter};
use crate::domain::hash_functions::MultiHasher;
use crate::error::FilterError;

/// Size of the `m`/`k` header in bytes
pub const HEADER_LEN: usize = 16;

/// Total encoded length for a filter of `m` bits
///
/// `None` if it does not fit in `usize`.
pub fn encoded_len(m: u64) -> Option<usize> {
    let body = m.div_ceil(WORD_BITS).checked_mul(WORD_BYTES as u64)?;
    usize::try_from(body).ok()?.checked_add(HEADER_LEN)
}

/// Read `(m, k)` from the header without touching the body
pub(crate) fn read_header(bytes: &[u8]) -> Result<(u64, u64), FilterError> {
    if bytes.len() < HEADER_LEN {
        return Err(FilterError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let (m, rest) = read_u64_le(bytes);
    let (k, _) = read_u64_le(rest);
    Ok((m, k))
}

pub(crate) fn encode(m: u64, k: u64, bits: &BitArray) -> Vec<u8> {
    let body = bits.export_bytes();
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&m.to_le_bytes());
    out.extend_from_slice(&k.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub(crate) fn decode(bytes: &[u8]) -> Result<(u64, u64, BitArray), FilterError> {
    let result = decode_inner(bytes);
    if let Err(err) = &result {
        warn!(len = bytes.len(), error = %err, "Rejected bloom filter data");
    }
    result
}

fn decode_inner(bytes: &[u8]) -> Result<(u64, u64, BitArray), FilterError> {
    let (m, k) = read_header(bytes)?;
    validate_shape(m, k)?;

    let expected = encoded_len(m).ok_or_else(|| {
        FilterError::InvalidParameters(format!("filter size m={} is not addressable", m))
    })?;
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

    let bits = BitArray::import_bytes(m, &bytes[HEADER_LEN..])?;
    Ok((m, k, bits))
}

fn read_u64_le(bytes: &[u8]) -> (u64, &[u8]) {
    let (head, rest) = bytes.split_at(WORD_BYTES);
    let mut word = [0u8; WORD_BYTES];
    word.copy_from_slice(head);
    (u64::from_le_bytes(word), rest)
}

impl<H: MultiHasher> Serialize for BloomFilter<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.export_data())
    }
}

/// Deserializes into an unsynchronized filter with the default hasher state
impl<'de, H: MultiHasher> Deserialize<'de> for BloomFilter<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = deserializer.deserialize_byte_buf(BytesVisitor)?;
        BloomFilter::import_data_with_hasher(&bytes, false, H::default())
            .map_err(de::Error::custom)
    }
}

struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("exported bloom filter bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1 << 16));
        while let Some(byte) = seq.next_element::<u8>()? {
            out.push(byte);
        }
        Ok(out)
    }
}
