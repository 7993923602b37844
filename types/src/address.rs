//! 20-byte addresses and their bech32 text form.
//!
//! Text format: `{chain-alias}-{bech32(hrp, address)}`, e.g. `X-avax1…`.
//! The human-readable part is the per-network prefix; the payload is the
//! 20 raw bytes regrouped into 5-bit words. The raw bytes also have a
//! cb58 form used by a handful of RPC fields.

use std::fmt;

use bech32::{Bech32, Hrp};

use crate::cb58;
use crate::error::CodecError;

/// Length of a raw address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A raw 20-byte address. Ordering is byte-wise, which is the canonical
/// order owner lists are serialized in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|_| CodecError::InvalidLength {
                expected: ADDRESS_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Encode as `{chain_alias}-{bech32(hrp, bytes)}`.
    pub fn to_bech32(&self, chain_alias: &str, hrp: &str) -> Result<String, CodecError> {
        let hrp = Hrp::parse(hrp).map_err(|e| CodecError::Bech32(e.to_string()))?;
        let encoded = bech32::encode::<Bech32>(hrp, &self.0)
            .map_err(|e| CodecError::Bech32(e.to_string()))?;
        Ok(format!("{chain_alias}-{encoded}"))
    }

    /// Parse `{chain_alias}-{bech32}`, returning the alias and the address.
    pub fn from_bech32(s: &str) -> Result<(String, Self), CodecError> {
        let (alias, encoded) = s
            .split_once('-')
            .ok_or_else(|| CodecError::InvalidAddress(format!("missing chain alias: {s}")))?;
        let (_hrp, data) =
            bech32::decode(encoded).map_err(|e| CodecError::Bech32(e.to_string()))?;
        let addr = Self::from_slice(&data)?;
        Ok((alias.to_string(), addr))
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.0)
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_slice(&cb58::decode(s)?)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}
