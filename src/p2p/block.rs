//! Block payload decoding.
//!
//! Transactions are read as a version followed directly by their outputs;
//! inputs and lock time are not part of this model.

use serde::{Serialize, Serializer};

use crate::p2p::error::P2pError;
use crate::p2p::utils::{hash_hex, read_array, read_i32, read_u32, read_u64, read_varint, sha256d, skip_prefixed};

pub const BLOCK_HEADER_SIZE: usize = 80;

fn serialize_hash<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_hex(hash))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub version: i32,
    #[serde(serialize_with = "serialize_hash")]
    pub prev_block_hash: [u8; 32],
    #[serde(serialize_with = "serialize_hash")]
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn parse(payload: &[u8], cursor: &mut usize) -> Result<Self, P2pError> {
        Ok(BlockHeader {
            version: read_i32(payload, cursor)?,
            prev_block_hash: read_array(payload, cursor)?,
            merkle_root: read_array(payload, cursor)?,
            timestamp: read_u32(payload, cursor)?,
            bits: read_u32(payload, cursor)?,
            nonce: read_u32(payload, cursor)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut bytes = [0u8; BLOCK_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.prev_block_hash);
        bytes[36..68].copy_from_slice(&self.merkle_root);
        bytes[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.bits.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Block identity hash, in wire byte order.
    pub fn hash(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub value: u64,
    pub script_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub version: i32,
    pub outputs: Vec<Output>,
}

impl Transaction {
    fn parse(payload: &[u8], cursor: &mut usize) -> Result<Self, P2pError> {
        let version = read_i32(payload, cursor)?;
        let output_count = read_varint(payload, cursor)?;

        // An output is at least 9 bytes; never trust the count for capacity.
        let remaining = payload.len().saturating_sub(*cursor);
        let mut outputs = Vec::with_capacity((output_count as usize).min(remaining / 9));
        for _ in 0..output_count {
            let value = read_u64(payload, cursor)?;
            let script_len = skip_prefixed(payload, cursor)?;
            outputs.push(Output { value, script_len });
        }

        Ok(Transaction { version, outputs })
    }

    pub fn total_value(&self) -> u64 {
        self.outputs.iter().fold(0u64, |sum, o| sum.saturating_add(o.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    #[serde(serialize_with = "serialize_hash")]
    pub requested_hash: [u8; 32],
    #[serde(serialize_with = "serialize_hash")]
    pub computed_hash: [u8; 32],
}

/// Decodes a `block` payload fetched under `requested_hash`.
pub fn decode(payload: &[u8], requested_hash: [u8; 32]) -> Result<Block, P2pError> {
    let mut c = 0;
    let header = BlockHeader::parse(payload, &mut c)?;
    let tx_count = read_varint(payload, &mut c)?;

    let remaining = payload.len().saturating_sub(c);
    let mut transactions = Vec::with_capacity((tx_count as usize).min(remaining / 5));
    for _ in 0..tx_count {
        transactions.push(Transaction::parse(payload, &mut c)?);
    }

    let computed_hash = header.hash();
    Ok(Block {
        header,
        transactions,
        requested_hash,
        computed_hash,
    })
}
