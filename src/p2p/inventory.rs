use crate::p2p::error::P2pError;
use crate::p2p::utils::{hash_hex, read_array, read_u32, read_varint};
use crate::p2p::varint;

pub const INV_ENTRY_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryType {
    Error,
    Transaction,
    Block,
    FilteredBlock,
    CompactBlock,
    WitnessTransaction,
    WitnessBlock,
    FilteredWitnessBlock,
    Unknown(u32),
}

impl InventoryType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => InventoryType::Error,
            1 => InventoryType::Transaction,
            2 => InventoryType::Block,
            3 => InventoryType::FilteredBlock,
            4 => InventoryType::CompactBlock,
            0x40000001 => InventoryType::WitnessTransaction,
            0x40000002 => InventoryType::WitnessBlock,
            0x40000003 => InventoryType::FilteredWitnessBlock,
            other => InventoryType::Unknown(other),
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            InventoryType::Error => 0,
            InventoryType::Transaction => 1,
            InventoryType::Block => 2,
            InventoryType::FilteredBlock => 3,
            InventoryType::CompactBlock => 4,
            InventoryType::WitnessTransaction => 0x40000001,
            InventoryType::WitnessBlock => 0x40000002,
            InventoryType::FilteredWitnessBlock => 0x40000003,
            InventoryType::Unknown(value) => *value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InventoryType::Error => "ERROR",
            InventoryType::Transaction => "TX",
            InventoryType::Block => "BLOCK",
            InventoryType::FilteredBlock => "FILTERED_BLOCK",
            InventoryType::CompactBlock => "COMPACT_BLOCK",
            InventoryType::WitnessTransaction => "WITNESS_TX",
            InventoryType::WitnessBlock => "WITNESS_BLOCK",
            InventoryType::FilteredWitnessBlock => "FILTERED_WITNESS_BLOCK",
            InventoryType::Unknown(_) => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub inv_type: InventoryType,
    pub hash: [u8; 32],
}

impl InventoryItem {
    pub fn block(hash: [u8; 32]) -> Self {
        InventoryItem {
            inv_type: InventoryType::Block,
            hash,
        }
    }

    pub fn hash_hex(&self) -> String {
        hash_hex(&self.hash)
    }
}

/// Parses an `inv` (or `notfound`) payload. A payload that cannot hold the
/// declared number of entries is rejected as a whole.
pub fn parse_inv(payload: &[u8]) -> Result<Vec<InventoryItem>, P2pError> {
    let mut c = 0;
    let count = read_varint(payload, &mut c)?;

    let fits = (payload.len() - c) / INV_ENTRY_SIZE;
    if count > fits as u64 {
        return Err(P2pError::TruncatedInventory { declared: count, fits });
    }

    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inv_type = InventoryType::from_u32(read_u32(payload, &mut c)?);
        let hash = read_array::<32>(payload, &mut c)?;
        items.push(InventoryItem { inv_type, hash });
    }
    Ok(items)
}

pub fn build_getdata_payload(items: &[InventoryItem]) -> Vec<u8> {
    let mut payload = varint::encode(items.len() as u64);
    for item in items {
        payload.extend(item.inv_type.as_u32().to_le_bytes());
        payload.extend(item.hash);
    }
    payload
}

/// Hashes of the plain block entries, in announcement order.
pub fn block_hashes(items: &[InventoryItem]) -> Vec<[u8; 32]> {
    items
        .iter()
        .filter(|item| item.inv_type == InventoryType::Block)
        .map(|item| item.hash)
        .collect()
}
