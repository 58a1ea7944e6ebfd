use crate::p2p::block::Block;
use crate::p2p::utils::sha256d;

/// Recomputes the header's double SHA-256 and compares it with the hash the
/// block was requested under. A mismatch is a result, not an error.
pub fn verify(block: &Block) -> bool {
    sha256d(&block.header.to_bytes()) == block.requested_hash
}
