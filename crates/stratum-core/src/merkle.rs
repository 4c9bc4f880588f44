//! Merkle root computation from a coinbase and a Stratum merkle branch.

use crate::hash::double_sha256;

/// Fold a coinbase hash with the pool's merkle branch.
///
/// Each step hashes `acc || branch`, accumulator first. Branches are applied in
/// the order the pool sent them and no byte reversal happens here, so the
/// caller must supply hashes in the order concatenation expects.
pub fn merkle_root_from_hash(coinbase_hash: [u8; 32], branches: &[[u8; 32]]) -> [u8; 32] {
    let mut combined = [0u8; 64];
    let mut acc = coinbase_hash;

    for branch in branches {
        combined[..32].copy_from_slice(&acc);
        combined[32..].copy_from_slice(branch);
        acc = double_sha256(&combined);
    }

    acc
}

/// Compute the merkle root for a serialized coinbase transaction.
///
/// With an empty branch list the root is the coinbase hash itself.
pub fn compute_merkle_root(coinbase: &[u8], branches: &[[u8; 32]]) -> [u8; 32] {
    merkle_root_from_hash(double_sha256(coinbase), branches)
}
