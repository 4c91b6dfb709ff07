//! Block header codec
//!
//! Serializes the fixed 80-byte header layout and computes its
//! proof-of-work hash.

use crate::crypto::hash256;
use crate::{BlockHash, Error, Nonce, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};

/// Serialized header size in bytes
pub const HEADER_SIZE: usize = 80;

/// A block header
///
/// Field order and widths are consensus-fixed: version(4 LE),
/// previous hash(32), merkle root(32), timestamp(4 LE), bits(4 LE),
/// nonce(4 LE). The two 32-byte digests are written as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Hash of the previous block (all-zero for genesis)
    pub prev_hash: BlockHash,
    /// Merkle root over the block's transaction ids
    pub merkle_root: BlockHash,
    /// Block time in Unix seconds
    pub timestamp: u32,
    /// Compact target
    pub bits: u32,
    /// Proof-of-work nonce
    pub nonce: Nonce,
}

impl BlockHeader {
    /// Serialize the header into its canonical 80-byte form
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut cursor = Cursor::new(&mut bytes[..]);

        // Writes into a fixed 80-byte buffer cannot fail
        cursor.write_i32::<LittleEndian>(self.version).unwrap();
        cursor.write_all(self.prev_hash.as_bytes()).unwrap();
        cursor.write_all(self.merkle_root.as_bytes()).unwrap();
        cursor.write_u32::<LittleEndian>(self.timestamp).unwrap();
        cursor.write_u32::<LittleEndian>(self.bits).unwrap();
        cursor.write_u32::<LittleEndian>(self.nonce.value()).unwrap();

        bytes
    }

    /// Deserialize a header from its 80-byte form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEADER_SIZE {
            return Err(Error::encoding(format!(
                "invalid header length: expected {HEADER_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let version = cursor.read_i32::<LittleEndian>()?;

        let mut prev_hash = [0u8; 32];
        cursor.read_exact(&mut prev_hash)?;
        let mut merkle_root = [0u8; 32];
        cursor.read_exact(&mut merkle_root)?;

        let timestamp = cursor.read_u32::<LittleEndian>()?;
        let bits = cursor.read_u32::<LittleEndian>()?;
        let nonce = Nonce::new(cursor.read_u32::<LittleEndian>()?);

        Ok(Self {
            version,
            prev_hash: BlockHash::new(prev_hash),
            merkle_root: BlockHash::new(merkle_root),
            timestamp,
            bits,
            nonce,
        })
    }

    /// Double-SHA-256 hash of the serialized header
    pub fn hash(&self) -> BlockHash {
        BlockHash::new(hash256(&self.to_bytes()))
    }

    /// Copy of this header with a different nonce
    pub fn with_nonce(&self, nonce: Nonce) -> Self {
        Self { nonce, ..*self }
    }
}
