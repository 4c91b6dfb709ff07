//! Core types for genesis mining
//!
//! Fundamental value types with binary encoding, compact-target decoding,
//! and display conventions shared by the miner and verifier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mining target representing the proof-of-work threshold
///
/// A 256-bit unsigned integer; a header hash must be strictly below it.
/// A smaller target means harder proof-of-work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    /// 256-bit target value stored as 4 64-bit words in little-endian order
    words: [u64; 4],
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Most significant word first
        self.words.iter().rev().cmp(other.words.iter().rev())
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Target {
    /// Create a new target from a 256-bit value
    pub fn new(words: [u64; 4]) -> Self {
        Self { words }
    }

    /// Decode a compact "bits" representation into a full target
    ///
    /// The top byte is a base-256 exponent, the low three bytes a mantissa:
    /// `target = mantissa * 256^(exponent - 3)` for exponent >= 3. For
    /// exponent < 3 the mantissa is shifted right instead (fractional
    /// targets round toward zero). Encodings whose mantissa would shift past
    /// 256 bits are rejected rather than silently truncated.
    pub fn from_compact(bits: u32) -> Result<Self> {
        let exponent = (bits >> 24) as usize;
        let mantissa = bits & 0x00ff_ffff;

        if mantissa == 0 {
            return Ok(Self::zero());
        }

        if exponent < 3 {
            let shifted = mantissa >> (8 * (3 - exponent));
            return Ok(Self::new([shifted as u64, 0, 0, 0]));
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in mantissa.to_le_bytes()[..3].iter().enumerate() {
            if *byte == 0 {
                continue;
            }
            let index = exponent - 3 + i;
            if index >= 32 {
                return Err(Error::target(format!(
                    "compact target 0x{bits:08x} overflows 256 bits"
                )));
            }
            bytes[index] = *byte;
        }

        Ok(Self::from_le_bytes(&bytes))
    }

    /// Encode this target into its compact "bits" representation
    ///
    /// Inverse of [`Target::from_compact`] for normalized encodings: the
    /// exponent is the significant byte length and the mantissa the top
    /// three bytes. Zero encodes as `0`.
    pub fn to_compact(&self) -> u32 {
        let bytes = self.to_le_bytes();
        let size = match bytes.iter().rposition(|b| *b != 0) {
            Some(top) => top + 1,
            None => return 0,
        };

        let mantissa = if size <= 3 {
            let mut m = 0u32;
            for i in (0..size).rev() {
                m = (m << 8) | bytes[i] as u32;
            }
            m << (8 * (3 - size))
        } else {
            let mut m = 0u32;
            for i in ((size - 3)..size).rev() {
                m = (m << 8) | bytes[i] as u32;
            }
            m
        };

        ((size as u32) << 24) | mantissa
    }

    /// Create a target from 32 little-endian bytes
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *word = u64::from_le_bytes(buf);
        }
        Self::new(words)
    }

    /// Convert the target to 32 little-endian bytes
    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, word) in self.words.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Check whether a 32-byte hash meets this target
    ///
    /// The hash is interpreted as a little-endian 256-bit integer, which is
    /// identical to reversing its bytes and reading big-endian (the display
    /// convention). The comparison is strict: a hash equal to the target
    /// does not meet it.
    pub fn meets(&self, hash: &[u8; 32]) -> bool {
        for i in (0..4).rev() {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&hash[i * 8..(i + 1) * 8]);
            let hash_word = u64::from_le_bytes(buf);

            if hash_word < self.words[i] {
                return true;
            } else if hash_word > self.words[i] {
                return false;
            }
        }
        false
    }

    /// Maximum possible target (easiest difficulty)
    pub fn max() -> Self {
        Self::new([u64::MAX; 4])
    }

    /// Zero target (unsatisfiable)
    pub fn zero() -> Self {
        Self::new([0; 4])
    }

    /// Convert to hexadecimal string (big-endian for display)
    pub fn to_hex_be(&self) -> String {
        format!(
            "{:016x}{:016x}{:016x}{:016x}",
            self.words[3], self.words[2], self.words[1], self.words[0]
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_be())
    }
}

/// Proof-of-work nonce (4 bytes)
///
/// The search variable varied until the header hash satisfies the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Nonce(pub u32);

impl Nonce {
    /// Create a new nonce
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the nonce value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Convert to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Next nonce, or `None` at the end of the 32-bit search space
    pub fn checked_increment(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte double-SHA-256 digest
///
/// Stored in the order the hash function produces it; rendered byte-reversed
/// in hex, the conventional big-endian display applied at every boundary
/// that prints or parses a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Create a hash from raw digest bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero hash (genesis previous-block hash, empty merkle root)
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as hex with bytes reversed (display convention)
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Render as hex in internal (computed) byte order
    ///
    /// Used where a downstream consumer stores the digest unreversed, such
    /// as the merkle root literal in a chain-parameters file.
    pub fn to_hex_internal(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from display-convention hex (bytes are reversed back)
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut array = Self::decode_hex(s)?;
        array.reverse();
        Ok(Self(array))
    }

    /// Parse from hex given in internal byte order
    pub fn from_hex_internal(s: &str) -> Result<Self> {
        Ok(Self(Self::decode_hex(s)?))
    }

    fn decode_hex(s: &str) -> Result<[u8; 32]> {
        let bytes = hex::decode(s)
            .map_err(|e| Error::encoding(format!("invalid hash hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(Error::encoding(format!(
                "invalid hash length: expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(array)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for BlockHash {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BlockHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
