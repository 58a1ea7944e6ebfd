//! Bitcoin CompactSize integers.
//!
//! | first byte | value                     | size |
//! |------------|---------------------------|------|
//! | `< 0xfd`   | the byte itself           | 1    |
//! | `0xfd`     | next 2 bytes, little end. | 3    |
//! | `0xfe`     | next 4 bytes, little end. | 5    |
//! | `0xff`     | next 8 bytes, little end. | 9    |

use crate::p2p::error::P2pError;

/// Decodes the varint starting at `offset`, returning the value and the
/// number of bytes it occupied.
pub fn decode(buffer: &[u8], offset: usize) -> Result<(u64, usize), P2pError> {
    let first = *buffer
        .get(offset)
        .ok_or_else(|| P2pError::truncated(buffer.len(), offset, 1))?;

    let width = match first {
        0xfd => 2,
        0xfe => 4,
        0xff => 8,
        _ => return Ok((first as u64, 1)),
    };

    let start = offset + 1;
    let bytes = buffer
        .get(start..start + width)
        .ok_or_else(|| P2pError::truncated(buffer.len(), start, width))?;

    let mut le = [0u8; 8];
    le[..width].copy_from_slice(bytes);
    Ok((u64::from_le_bytes(le), 1 + width))
}

/// Shortest encoding of `value`.
pub fn encode(value: u64) -> Vec<u8> {
    match value {
        0..=0xfc => vec![value as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend((value as u16).to_le_bytes());
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xfe];
            out.extend((value as u32).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0xff];
            out.extend(value.to_le_bytes());
            out
        }
    }
}
