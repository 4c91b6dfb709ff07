//! Coinbase transaction construction
//!
//! Serializes the single-input/single-output coinbase transaction of a
//! genesis block into its canonical byte encoding. The encoding is
//! byte-exact: any reordered field or miscounted length prefix changes the
//! transaction id and therefore the merkle root.

use crate::crypto::hash256;
use crate::{BlockHash, Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Previous-output index marking a coinbase input
const COINBASE_PREV_INDEX: u32 = 0xffff_ffff;

/// Final input sequence number
const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// OP_CHECKSIG opcode terminating a pay-to-pubkey script
const OP_CHECKSIG: u8 = 0xac;

/// Parameters for building the coinbase transaction
///
/// The signature script is the concatenation of a 4-byte little-endian
/// prefix, a single extra-nonce byte, and a length-prefixed message. This is
/// the canonical layout; a variant encoding the block height instead of the
/// prefix exists in the wild and is deliberately not supported, as the two
/// are not bit-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseParams {
    /// 4-byte field opening the signature script
    pub script_prefix: u32,
    /// Single byte following the prefix
    pub extra_nonce: u8,
    /// Human-readable message embedded in the signature script
    pub message: String,
    /// Recipient public key (65-byte uncompressed) paid by the output
    pub public_key: Vec<u8>,
    /// Output value in base subunits
    pub reward_subunits: u64,
}

/// A serialized coinbase transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransaction {
    bytes: Vec<u8>,
}

impl CoinbaseTransaction {
    /// Build and serialize the coinbase transaction
    ///
    /// Fails with an encoding error when the message, signature script, or
    /// public key exceeds what a single length-prefix byte can express.
    pub fn build(params: &CoinbaseParams) -> Result<Self> {
        let script_sig = build_script_sig(params)?;
        let script_pubkey = build_script_pubkey(&params.public_key)?;

        let mut tx = Vec::with_capacity(
            4 + 1 + 32 + 4 + 1 + script_sig.len() + 4 + 1 + 8 + 1 + script_pubkey.len() + 4,
        );

        // Version
        tx.write_i32::<LittleEndian>(1).unwrap();

        // Single coinbase input: null previous output
        tx.push(0x01);
        tx.write_all(&[0u8; 32]).unwrap();
        tx.write_u32::<LittleEndian>(COINBASE_PREV_INDEX).unwrap();
        tx.push(script_sig.len() as u8);
        tx.write_all(&script_sig).unwrap();
        tx.write_u32::<LittleEndian>(SEQUENCE_FINAL).unwrap();

        // Single reward output
        tx.push(0x01);
        tx.write_u64::<LittleEndian>(params.reward_subunits).unwrap();
        tx.push(script_pubkey.len() as u8);
        tx.write_all(&script_pubkey).unwrap();

        // Locktime
        tx.write_u32::<LittleEndian>(0).unwrap();

        Ok(Self { bytes: tx })
    }

    /// Get the serialized transaction bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Transaction id: double-SHA-256 of the serialized bytes
    pub fn txid(&self) -> BlockHash {
        BlockHash::new(hash256(&self.bytes))
    }
}

/// Build the signature script: prefix(4 LE) + extra nonce + length-prefixed message
fn build_script_sig(params: &CoinbaseParams) -> Result<Vec<u8>> {
    let message = params.message.as_bytes();
    if message.len() > u8::MAX as usize {
        return Err(Error::encoding(format!(
            "coinbase message is {} bytes, limit is {}",
            message.len(),
            u8::MAX
        )));
    }

    let mut script = Vec::with_capacity(4 + 1 + 1 + message.len());
    script.write_u32::<LittleEndian>(params.script_prefix).unwrap();
    script.push(params.extra_nonce);
    script.push(message.len() as u8);
    script.extend_from_slice(message);

    if script.len() > u8::MAX as usize {
        return Err(Error::encoding(format!(
            "signature script is {} bytes, limit is {}",
            script.len(),
            u8::MAX
        )));
    }

    Ok(script)
}

/// Build the output script: length-prefixed public key + OP_CHECKSIG
fn build_script_pubkey(public_key: &[u8]) -> Result<Vec<u8>> {
    if public_key.len() > u8::MAX as usize {
        return Err(Error::encoding(format!(
            "public key is {} bytes, limit is {}",
            public_key.len(),
            u8::MAX
        )));
    }

    let mut script = Vec::with_capacity(1 + public_key.len() + 1);
    script.push(public_key.len() as u8);
    script.extend_from_slice(public_key);
    script.push(OP_CHECKSIG);

    // The surrounding push byte counts the whole script, not just the key
    if script.len() > u8::MAX as usize {
        return Err(Error::encoding(format!(
            "output script is {} bytes, limit is {}",
            script.len(),
            u8::MAX
        )));
    }

    Ok(script)
}
