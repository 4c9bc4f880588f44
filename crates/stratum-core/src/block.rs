//! Block header assembly and hashing.
//!
//! Fields are kept in the byte form the pool sent them in. Nothing here
//! re-orders or re-endians a field; byte-order fixes for a particular pool
//! belong at the boundary (see [`crate::hash::swap_words`]).

use crate::error::{fixed, Result, WorkError};
use crate::hash::{double_sha256, sha256, swap_words};
use crate::midstate::{standard_padding, Midstate, BLOCK_SIZE};

/// Size of a block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Header plus its SHA256 length padding: two full blocks.
pub const PADDED_HEADER_SIZE: usize = 128;

/// Bytes of the header that follow the first SHA256 block.
pub const HEADER_TAIL_SIZE: usize = BLOCK_HEADER_SIZE - BLOCK_SIZE;

/// A block header (80 bytes), every field in serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: [u8; 4],
    /// Previous block hash, byte order as received from the pool.
    pub prev_block_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: [u8; 4],
    /// Compact difficulty target.
    pub bits: [u8; 4],
    pub nonce: [u8; 4],
}

impl BlockHeader {
    /// Create a new block header with a zero nonce.
    pub fn new(
        version: [u8; 4],
        prev_block_hash: [u8; 32],
        merkle_root: [u8; 32],
        time: [u8; 4],
        bits: [u8; 4],
    ) -> Self {
        BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce: [0u8; 4],
        }
    }

    /// Build a header from unchecked byte slices, validating every width.
    pub fn from_slices(
        version: &[u8],
        prev_block_hash: &[u8],
        merkle_root: &[u8],
        time: &[u8],
        bits: &[u8],
        nonce: &[u8],
    ) -> Result<Self> {
        Ok(BlockHeader {
            version: header_field("version", version)?,
            prev_block_hash: header_field("previous hash", prev_block_hash)?,
            merkle_root: header_field("merkle root", merkle_root)?,
            time: header_field("time", time)?,
            bits: header_field("bits", bits)?,
            nonce: header_field("nonce", nonce)?,
        })
    }

    /// Set the nonce, serialized big-endian like the other fields.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce.to_be_bytes();
        self
    }

    /// Replace ntime, e.g. when rolling time forward.
    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time.to_be_bytes();
        self
    }

    /// Replace the version, e.g. for version rolling.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version.to_be_bytes();
        self
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];
        header[..76].copy_from_slice(&self.serialize_without_nonce());
        header[76..80].copy_from_slice(&self.nonce);
        header
    }

    /// Serialize the header without the nonce (76 bytes).
    /// Used for efficient mining where we only change the nonce.
    pub fn serialize_without_nonce(&self) -> [u8; 76] {
        let mut header = [0u8; 76];

        header[0..4].copy_from_slice(&self.version);
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.time);
        header[72..76].copy_from_slice(&self.bits);

        header
    }

    /// The first SHA256 block: version, previous hash and 28 bytes of the merkle root.
    pub fn prefix(&self) -> [u8; BLOCK_SIZE] {
        let mut prefix = [0u8; BLOCK_SIZE];
        prefix.copy_from_slice(&self.serialize()[..BLOCK_SIZE]);
        prefix
    }

    /// The last 16 bytes: merkle root tail, time, bits and nonce.
    pub fn tail(&self) -> [u8; HEADER_TAIL_SIZE] {
        let mut tail = [0u8; HEADER_TAIL_SIZE];
        tail.copy_from_slice(&self.serialize()[BLOCK_SIZE..]);
        tail
    }

    /// Compute the header hash (double SHA256).
    pub fn hash(&self) -> [u8; 32] {
        header_hash(&self.serialize())
    }

    /// Midstate over the header's first block.
    pub fn midstate(&self) -> Midstate {
        Midstate::from_block(&self.prefix())
    }

    /// Header hash computed by resuming from a precomputed midstate.
    ///
    /// Equals [`BlockHeader::hash`] when `midstate` was taken from this
    /// header's prefix; only the tail block is compressed.
    pub fn hash_from_midstate(&self, midstate: &Midstate) -> [u8; 32] {
        let mut block = [0u8; BLOCK_SIZE];
        block[..HEADER_TAIL_SIZE].copy_from_slice(&self.tail());
        block[HEADER_TAIL_SIZE..].copy_from_slice(&standard_padding(BLOCK_HEADER_SIZE));

        let first = midstate.resume(&block);
        sha256(&first)
    }

    /// Header followed by its length padding, as consumed by midstate-continuation hardware.
    ///
    /// The padding words are byte-swapped to match the header's big-endian
    /// word layout.
    pub fn padded(&self) -> [u8; PADDED_HEADER_SIZE] {
        let mut padded = [0u8; PADDED_HEADER_SIZE];
        padded[..BLOCK_HEADER_SIZE].copy_from_slice(&self.serialize());
        padded[BLOCK_HEADER_SIZE..].copy_from_slice(&standard_padding(BLOCK_HEADER_SIZE));
        swap_words(&mut padded[BLOCK_HEADER_SIZE..]);
        padded
    }
}

/// Concatenate the six header fields into the 80 bytes that get hashed.
pub fn assemble_header(
    version: &[u8],
    previous_hash: &[u8],
    merkle_root: &[u8],
    time: &[u8],
    bits: &[u8],
    nonce: &[u8],
) -> Result<[u8; BLOCK_HEADER_SIZE]> {
    BlockHeader::from_slices(version, previous_hash, merkle_root, time, bits, nonce)
        .map(|header| header.serialize())
}

/// Double SHA256 of a serialized header; the value compared against a target.
pub fn header_hash(header: &[u8; BLOCK_HEADER_SIZE]) -> [u8; 32] {
    double_sha256(header)
}

/// Midstate over the first 64 bytes of a header.
pub fn header_for_midstate(header_prefix: &[u8]) -> Result<[u8; 32]> {
    let prefix: [u8; BLOCK_SIZE] = fixed("header prefix", header_prefix)?;
    Ok(Midstate::from_block(&prefix).to_bytes())
}

fn header_field<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    if bytes.is_empty() {
        return Err(WorkError::EmptyRequiredField { field });
    }
    fixed(field, bytes)
}
