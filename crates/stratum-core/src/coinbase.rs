//! Coinbase transaction assembly for pooled mining.
//!
//! The pool splits its coinbase transaction around the extranonce. Putting the
//! pieces back together is pure concatenation: the fragments already carry all
//! length prefixes, so nothing is re-encoded here.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{decode_hex, Result, WorkError};

/// Pad width used for extranonce1 when the caller does not declare one
/// (16 hex characters, 8 bytes).
pub const DEFAULT_EXTRANONCE1_HEX_WIDTH: usize = 16;

/// Widest extranonce2 a counter can fill.
pub const MAX_EXTRANONCE2_SIZE: usize = 8;

/// Pool-assigned extranonce1, zero-left-padded to a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraNonce1 {
    bytes: Vec<u8>,
}

impl ExtraNonce1 {
    /// Pad `hex` with leading `'0'` characters to `width` hex characters and decode it.
    ///
    /// Padding happens on the hex text, so the numeric value is preserved while
    /// the serialized width becomes fixed. A value already `width` characters
    /// wide is decoded unchanged.
    pub fn from_hex(hex: &str, width: usize) -> Result<Self> {
        if hex.len() > width {
            return Err(WorkError::ExtraNonceOverflow {
                width,
                actual: hex.len(),
            });
        }

        let mut padded = String::with_capacity(width);
        padded.extend(core::iter::repeat('0').take(width - hex.len()));
        padded.push_str(hex);

        let bytes = decode_hex("extranonce1", &padded)?;
        Ok(ExtraNonce1 { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Miner-assigned extranonce2.
///
/// The caller owns both the width and the increment policy; this type only
/// fixes how a counter is laid out in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraNonce2 {
    bytes: Vec<u8>,
}

impl ExtraNonce2 {
    /// Serialize `counter` little-endian into `width` bytes, dropping high bits that do not fit.
    pub fn new(counter: u64, width: usize) -> Result<Self> {
        if width == 0 || width > MAX_EXTRANONCE2_SIZE {
            return Err(WorkError::InvalidExtraNonceWidth { width });
        }

        let bytes = counter.to_le_bytes()[..width].to_vec();
        Ok(ExtraNonce2 { bytes })
    }

    /// Use caller-supplied bytes as they are.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ExtraNonce2 { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex form used in `mining.submit`.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Assemble the serialized coinbase: `part1 || extranonce1 || extranonce2 || part2`.
pub fn build_coinbase(
    part1: &[u8],
    extranonce1: &ExtraNonce1,
    extranonce2: &[u8],
    part2: &[u8],
) -> Result<Vec<u8>> {
    if part1.is_empty() {
        return Err(WorkError::EmptyRequiredField { field: "coinbase part1" });
    }
    if part2.is_empty() {
        return Err(WorkError::EmptyRequiredField { field: "coinbase part2" });
    }

    let mut coinbase =
        Vec::with_capacity(part1.len() + extranonce1.len() + extranonce2.len() + part2.len());
    coinbase.extend_from_slice(part1);
    coinbase.extend_from_slice(extranonce1.as_bytes());
    coinbase.extend_from_slice(extranonce2);
    coinbase.extend_from_slice(part2);
    Ok(coinbase)
}

/// Builder holding the parts of a coinbase that stay fixed for one job.
///
/// Only extranonce2 changes between attempts, so the builder is created once
/// per job and `build` is called per extranonce2.
#[derive(Debug, Clone)]
pub struct CoinbaseBuilder<'a> {
    part1: &'a [u8],
    part2: &'a [u8],
    extranonce1: &'a ExtraNonce1,
}

impl<'a> CoinbaseBuilder<'a> {
    /// Create a new coinbase builder.
    pub fn new(part1: &'a [u8], part2: &'a [u8], extranonce1: &'a ExtraNonce1) -> Self {
        CoinbaseBuilder {
            part1,
            part2,
            extranonce1,
        }
    }

    /// Build the coinbase transaction for one extranonce2.
    pub fn build(&self, extranonce2: &ExtraNonce2) -> Result<Vec<u8>> {
        build_coinbase(self.part1, self.extranonce1, extranonce2.as_bytes(), self.part2)
    }
}
