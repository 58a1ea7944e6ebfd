use sha2::{Digest, Sha256};

use crate::p2p::error::P2pError;
use crate::p2p::varint;

pub const CMD_VERSION: &str = "version";
pub const CMD_VERACK: &str = "verack";
pub const CMD_INV: &str = "inv";
pub const CMD_GETDATA: &str = "getdata";
pub const CMD_BLOCK: &str = "block";
pub const CMD_NOTFOUND: &str = "notfound";
pub const CMD_PING: &str = "ping";
pub const CMD_PONG: &str = "pong";

pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Bitcoin displays hashes in reverse byte order.
pub fn hash_hex(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parses a hash written in display order into wire order.
pub fn parse_hash_hex(s: &str) -> Result<[u8; 32], P2pError> {
    let bytes = hex::decode(s.trim()).map_err(|e| P2pError::InvalidHash(format!("{}: {}", s, e)))?;
    let mut hash: [u8; 32] = bytes
        .try_into()
        .map_err(|_| P2pError::InvalidHash(format!("{}: expected 32 bytes", s)))?;
    hash.reverse();
    Ok(hash)
}

pub fn take<'a>(payload: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], P2pError> {
    let end = cursor
        .checked_add(len)
        .filter(|&end| end <= payload.len())
        .ok_or_else(|| P2pError::truncated(payload.len(), *cursor, len))?;
    let bytes = &payload[*cursor..end];
    *cursor = end;
    Ok(bytes)
}

pub fn read_array<const N: usize>(payload: &[u8], cursor: &mut usize) -> Result<[u8; N], P2pError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(payload, cursor, N)?);
    Ok(out)
}

pub fn read_u32(payload: &[u8], cursor: &mut usize) -> Result<u32, P2pError> {
    Ok(u32::from_le_bytes(read_array(payload, cursor)?))
}

pub fn read_i32(payload: &[u8], cursor: &mut usize) -> Result<i32, P2pError> {
    Ok(i32::from_le_bytes(read_array(payload, cursor)?))
}

pub fn read_u64(payload: &[u8], cursor: &mut usize) -> Result<u64, P2pError> {
    Ok(u64::from_le_bytes(read_array(payload, cursor)?))
}

pub fn read_varint(payload: &[u8], cursor: &mut usize) -> Result<u64, P2pError> {
    let (value, used) = varint::decode(payload, *cursor)?;
    *cursor += used;
    Ok(value)
}

/// Reads a varint length and skips that many bytes.
pub fn skip_prefixed(payload: &[u8], cursor: &mut usize) -> Result<usize, P2pError> {
    let len = read_varint(payload, cursor)?;
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    take(payload, cursor, len)?;
    Ok(len)
}
