//! Core types for REMIT
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Provides fundamental type aliases and the packed bitstring used as the
//! row/column label of every reduced system.

use crate::error::{RemitError, RemitResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Physical measurement channel identifier (0-indexed)
/// Gantree: ChannelId // pub type ChannelId = usize
pub type ChannelId = usize;

/// Measurement counts: bitstring -> count
///
/// Insertion order is significant: the first appearance of a bitstring fixes
/// its row/column in the reduced system.
/// Gantree: Counts // pub type Counts = IndexMap<String, u64>
pub type Counts = IndexMap<String, u64>;

const WORD_BITS: usize = 64;

// ============================================================================
// Bitstring
// ============================================================================

/// Fixed-length bitstring, channel 0 is the least-significant (rightmost) bit
/// Gantree: Bitstring // 비트열 타입
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bitstring {
    words: Vec<u64>,
    len: usize,
}

impl Bitstring {
    /// Create zero bitstring of given length
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS).max(1)],
            len,
        }
    }

    /// Create from string (e.g., "0110"), rightmost character is bit 0
    /// Gantree: parse(s) -> Self // 파싱
    pub fn parse(s: &str) -> RemitResult<Self> {
        let len = s.len();
        let mut out = Self::zeros(len);
        for (index, c) in s.bytes().rev().enumerate() {
            match c {
                b'0' => {}
                b'1' => out.set(index, true),
                _ => return Err(RemitError::InvalidBitstring(s.to_string())),
            }
        }
        Ok(out)
    }

    /// Create from the low `len` bits of an integer
    pub fn from_u64(value: u64, len: usize) -> Self {
        let mut out = Self::zeros(len);
        for index in 0..len.min(WORD_BITS) {
            if (value >> index) & 1 == 1 {
                out.set(index, true);
            }
        }
        out
    }

    /// Get the number of bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get bit at index (LSB = index 0)
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bit(index) == 1)
    }

    /// Bit at index as 0/1, no range check beyond debug builds
    #[inline]
    pub fn bit(&self, index: usize) -> usize {
        debug_assert!(index < self.len);
        ((self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1) as usize
    }

    /// Set bit at index
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len);
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= mask;
        } else {
            self.words[index / WORD_BITS] &= !mask;
        }
    }

    /// Flip bit at index
    #[inline]
    pub fn flip(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / WORD_BITS] ^= 1u64 << (index % WORD_BITS);
    }

    /// Count number of 1s (Hamming weight)
    /// Gantree: popcount() -> usize // 1 카운트
    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Hamming distance to a bitstring of the same length
    /// Gantree: hamming_distance(other) -> usize // 해밍 거리
    pub fn hamming_distance(&self, other: &Self) -> usize {
        debug_assert_eq!(self.len, other.len);
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    /// Check `hamming_distance(other) <= distance`, stopping early
    pub fn within_distance(&self, other: &Self, distance: usize) -> bool {
        let mut sum = 0usize;
        for (a, b) in self.words.iter().zip(&other.words) {
            sum += (a ^ b).count_ones() as usize;
            if sum > distance {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in (0..self.len).rev() {
            write!(f, "{}", if self.bit(index) == 1 { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Bitstring {
    type Error = RemitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Bitstring> for String {
    fn from(value: Bitstring) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Counts Helpers
// ============================================================================

/// Total number of shots in a counts mapping
pub fn total_shots(counts: &Counts) -> RemitResult<u64> {
    counts
        .values()
        .try_fold(0u64, |acc, &c| acc.checked_add(c))
        .ok_or(RemitError::ShotOverflow)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lsb_is_rightmost() {
        let bs = Bitstring::parse("0011").unwrap();
        assert_eq!(bs.len(), 4);
        assert_eq!(bs.get(0), Some(true));
        assert_eq!(bs.get(1), Some(true));
        assert_eq!(bs.get(2), Some(false));
        assert_eq!(bs.get(3), Some(false));
        assert_eq!(bs.get(4), None);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Bitstring::parse("01a1").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["0", "1", "0110", "1000000000000000000000000000000000000000000000000000000000000000001"] {
            assert_eq!(Bitstring::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_from_u64() {
        assert_eq!(Bitstring::from_u64(5, 4).to_string(), "0101");
        assert_eq!(Bitstring::from_u64(0, 3).to_string(), "000");
    }

    #[test]
    fn test_popcount() {
        let bs = Bitstring::parse("01101").unwrap();
        assert_eq!(bs.popcount(), 3);
    }

    #[test]
    fn test_hamming_distance_multiword() {
        let a = Bitstring::zeros(130);
        let mut b = a.clone();
        b.flip(0);
        b.flip(64);
        b.flip(129);
        assert_eq!(a.hamming_distance(&b), 3);
        assert!(a.within_distance(&b, 3));
        assert!(!a.within_distance(&b, 2));
    }

    #[test]
    fn test_flip_and_set() {
        let mut bs = Bitstring::zeros(3);
        bs.flip(2);
        assert_eq!(bs.to_string(), "100");
        bs.set(2, false);
        bs.set(0, true);
        assert_eq!(bs.to_string(), "001");
    }

    #[test]
    fn test_serde_as_string() {
        let bs = Bitstring::parse("1010").unwrap();
        let json = serde_json::to_string(&bs).unwrap();
        assert_eq!(json, "\"1010\"");
        let back: Bitstring = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bs);
    }

    #[test]
    fn test_total_shots() {
        let mut counts = Counts::new();
        counts.insert("00".into(), 7);
        counts.insert("11".into(), 3);
        assert_eq!(total_shots(&counts).unwrap(), 10);

        counts.insert("01".into(), u64::MAX);
        assert_eq!(total_shots(&counts).unwrap_err(), RemitError::ShotOverflow);
    }
}
