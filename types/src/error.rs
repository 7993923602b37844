//! Codec error type shared across crates.

use thiserror::Error;

/// Errors produced while encoding or decoding wire forms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer truncated: needed {needed} more bytes, {remaining} remaining")]
    TruncatedBuffer { needed: usize, remaining: usize },

    #[error("unknown type id {0}")]
    UnknownTypeId(u32),

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("base-58 decode failed: {0}")]
    Base58(String),

    #[error("bech32 error: {0}")]
    Bech32(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("threshold {threshold} exceeds {addresses} owner addresses")]
    InvalidThreshold { threshold: u32, addresses: usize },

    #[error("unsupported codec version {0}")]
    UnsupportedCodec(u16),

    #[error("invalid utf-8 in string field")]
    InvalidString,

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}
