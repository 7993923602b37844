//! Fundamental types for the client SDK.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: identifiers, addresses, output owner sets, the big-endian
//! wire primitives, checksummed base-58 encoding, and the static network
//! configuration tables.

pub mod address;
pub mod bytes;
pub mod cb58;
pub mod error;
pub mod ids;
pub mod network;
pub mod owners;

pub use address::Address;
pub use bytes::{ByteReader, ByteWriter};
pub use error::CodecError;
pub use ids::{AssetId, ChainId, NodeId, TxId};
pub use network::{ChainParams, NetworkParams};
pub use owners::OutputOwners;
