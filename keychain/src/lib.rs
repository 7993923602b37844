//! secp256k1 key management for transaction signing.
//!
//! Defines the [`KeyChain`] capability consumed by the signing pipeline,
//! plus an in-memory implementation over secp256k1 secret keys. Addresses
//! are ripemd160(sha256(compressed public key)).

pub mod error;
pub mod keys;

pub use error::KeychainError;
pub use keys::{KeyPair, SecpKeyChain};

use avax_types::Address;

/// Capability used by the signing pipeline.
///
/// `sign` produces a 65-byte recoverable ECDSA signature (r ‖ s ‖ v) over a
/// 32-byte digest, for the key that controls `address`.
pub trait KeyChain {
    /// Whether this keychain holds the key for `address`.
    fn has_address(&self, address: &Address) -> bool;

    /// All addresses this keychain controls.
    fn addresses(&self) -> Vec<Address>;

    /// Sign `digest` with the key controlling `address`.
    fn sign(&self, address: &Address, digest: &[u8; 32]) -> Result<[u8; 65], KeychainError>;
}
