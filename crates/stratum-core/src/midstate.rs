//! SHA256 midstate computation.
//!
//! Built on `sha2`'s raw block compression. Processing the fixed first 64
//! bytes of a header once lets a nonce search re-hash only the second block
//! per attempt.

use alloc::vec::Vec;

use sha2::compress256;
use sha2::digest::generic_array::GenericArray;

use crate::error::{fixed, Result, WorkError};
use crate::hash::swap_words;

/// Size of one SHA256 message block.
pub const BLOCK_SIZE: usize = 64;

/// SHA256 initial hash values.
const H_INIT: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// SHA256 internal state after absorbing one or more whole blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Midstate {
    state: [u32; 8],
}

impl Midstate {
    /// Absorb a single 64-byte block starting from the SHA256 initial state.
    pub fn from_block(block: &[u8; BLOCK_SIZE]) -> Self {
        let mut state = H_INIT;
        compress(&mut state, block);
        Midstate { state }
    }

    /// Rebuild a midstate from its 32-byte big-endian serialization.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut state = [0u32; 8];
        for (word, chunk) in state.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Midstate { state }
    }

    /// The eight state words as 32 bytes, each word big-endian.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// The raw state words.
    pub fn words(&self) -> &[u32; 8] {
        &self.state
    }

    /// Compress one more block on top of this state and return the result.
    ///
    /// When `block` is the final, already padded block of the message, the
    /// returned bytes are the complete SHA256 digest.
    pub fn resume(&self, block: &[u8; BLOCK_SIZE]) -> [u8; 32] {
        let mut next = *self;
        compress(&mut next.state, block);
        next.to_bytes()
    }
}

/// Compute the SHA256 state after processing exactly one 64-byte block.
///
/// No length padding is applied and the state is returned as-is (big-endian
/// words, no byte reversal), so this is not a digest.
pub fn compute_midstate(block: &[u8]) -> Result<[u8; 32]> {
    let block: [u8; BLOCK_SIZE] = fixed("midstate block", block)?;
    Ok(Midstate::from_block(&block).to_bytes())
}

/// SHA256 length-encoding suffix for a message of `message_len` bytes.
///
/// Returns the `0x80` marker, zero fill and 64-bit bit length that complete
/// the message to a whole number of blocks, with each 32-bit word byte-swapped
/// so it lines up with header fields given as big-endian words. For an
/// 80-byte header this is `00000080`, forty zero bytes, `80020000`.
pub fn continuation_padding(message_len: usize) -> Result<Vec<u8>> {
    if message_len % 4 != 0 {
        return Err(WorkError::InvalidInputLength {
            field: "padded message",
            expected: message_len.next_multiple_of(4),
            actual: message_len,
        });
    }

    let mut padding = standard_padding(message_len);
    swap_words(&mut padding);
    Ok(padding)
}

/// Plain FIPS 180-4 padding for a message of `message_len` bytes.
pub(crate) fn standard_padding(message_len: usize) -> Vec<u8> {
    // Room for the 0x80 marker and the 8-byte length.
    let padded_len = (message_len + 9).next_multiple_of(BLOCK_SIZE);
    let mut padding = Vec::with_capacity(padded_len - message_len);
    padding.push(0x80);
    padding.resize(padded_len - message_len - 8, 0);
    padding.extend_from_slice(&((message_len as u64) * 8).to_be_bytes());
    padding
}

/// SHA256 compression function: process one 64-byte block, updating `state` in place.
fn compress(state: &mut [u32; 8], block: &[u8; BLOCK_SIZE]) {
    let block = GenericArray::clone_from_slice(block);
    compress256(state, core::slice::from_ref(&block));
}
