//! Errors raised while turning pool messages into hashable work.
//!
//! Every error here means the upstream message was malformed or the caller
//! misused an API. None of them are transient, so callers should drop the job
//! rather than retry.

use thiserror::Error;

/// Errors produced by the work processing core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// A fixed-width field had the wrong number of bytes.
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidInputLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// extranonce1 is wider than the declared pad width.
    #[error("extranonce1 is {actual} hex characters, wider than the declared {width}")]
    ExtraNonceOverflow { width: usize, actual: usize },

    /// A required field was empty.
    #[error("{field} must not be empty")]
    EmptyRequiredField { field: &'static str },

    /// A hex string from the pool could not be decoded.
    #[error("{field} is not valid hex")]
    InvalidHex { field: &'static str },

    /// extranonce2 width outside the supported range.
    #[error("extranonce2 width must be between 1 and 8 bytes, got {width}")]
    InvalidExtraNonceWidth { width: usize },
}

pub type Result<T, E = WorkError> = core::result::Result<T, E>;

/// Check that `bytes` is exactly `N` bytes long and copy it into an array.
pub(crate) fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| WorkError::InvalidInputLength {
            field,
            expected: N,
            actual: bytes.len(),
        })
}

/// Decode a pool-supplied hex string.
pub(crate) fn decode_hex(field: &'static str, value: &str) -> Result<alloc::vec::Vec<u8>> {
    hex::decode(value).map_err(|_| WorkError::InvalidHex { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_fixed_width() {
        let ok: [u8; 4] = fixed("version", &[1, 2, 3, 4]).unwrap();
        assert_eq!(ok, [1, 2, 3, 4]);

        let err = fixed::<4>("version", &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            WorkError::InvalidInputLength {
                field: "version",
                expected: 4,
                actual: 3,
            }
        );
        assert_eq!(err.to_string(), "version must be 4 bytes, got 3");
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("bits", "1710b4f8").unwrap(), [0x17, 0x10, 0xb4, 0xf8]);
        assert_eq!(
            decode_hex("bits", "zz").unwrap_err(),
            WorkError::InvalidHex { field: "bits" }
        );
    }
}
