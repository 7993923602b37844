//! Key pairs and the in-memory keychain.
//!
//! Address derivation: ripemd160(sha256(compressed public key)), 20 bytes.
//! Private keys travel as cb58 strings with the `PrivateKey-` prefix.

use std::collections::HashMap;

use ripemd::Ripemd160;
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use avax_types::{cb58, Address};

use crate::error::KeychainError;
use crate::KeyChain;

/// Text prefix for serialized private keys.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// A secp256k1 key pair and its derived address.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh key pair from a secure random source.
    pub fn generate<R: secp256k1::rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(rng);
        let address = address_from_public_key(&public);
        Self {
            secret,
            public,
            address,
        }
    }

    /// Reconstruct a key pair from 32 raw secret-key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeychainError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| KeychainError::InvalidKey(e.to_string()))?;
        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let address = address_from_public_key(&public);
        Ok(Self {
            secret,
            public,
            address,
        })
    }

    /// Parse a `PrivateKey-`-prefixed cb58 private key string.
    pub fn from_private_key_string(s: &str) -> Result<Self, KeychainError> {
        let raw = s.strip_prefix(PRIVATE_KEY_PREFIX).unwrap_or(s);
        let bytes = cb58::decode(raw).map_err(|e| KeychainError::InvalidKey(e.to_string()))?;
        Self::from_secret_bytes(&bytes)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Serialize the private key in its text form.
    pub fn private_key_string(&self) -> String {
        format!(
            "{}{}",
            PRIVATE_KEY_PREFIX,
            cb58::encode(&self.secret.secret_bytes())
        )
    }

    /// Sign a 32-byte digest, returning r ‖ s ‖ recovery-id.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 65] {
        let secp = Secp256k1::new();
        let msg = Message::from_digest(*digest);
        let sig: RecoverableSignature = secp.sign_ecdsa_recoverable(&msg, &self.secret);
        let (rec_id, compact) = sig.serialize_compact();
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&compact);
        out[64] = rec_id.to_i32() as u8;
        out
    }
}

/// Derive the 20-byte address of a public key.
pub fn address_from_public_key(public: &PublicKey) -> Address {
    let sha = Sha256::digest(public.serialize());
    let ripe = Ripemd160::digest(sha);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&ripe);
    Address::new(bytes)
}

/// In-memory keychain over secp256k1 keys, indexed by address.
#[derive(Default)]
pub struct SecpKeyChain {
    keys: HashMap<Address, KeyPair>,
}

impl SecpKeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and store a fresh key, returning its address.
    pub fn make_key<R: secp256k1::rand::Rng + ?Sized>(&mut self, rng: &mut R) -> Address {
        let pair = KeyPair::generate(rng);
        let address = pair.address();
        self.keys.insert(address, pair);
        address
    }

    /// Import a private key (`PrivateKey-…` or bare cb58), returning its address.
    pub fn import_key(&mut self, s: &str) -> Result<Address, KeychainError> {
        let pair = KeyPair::from_private_key_string(s)?;
        let address = pair.address();
        self.keys.insert(address, pair);
        Ok(address)
    }

    pub fn get(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyChain for SecpKeyChain {
    fn has_address(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }

    fn addresses(&self) -> Vec<Address> {
        let mut addrs: Vec<Address> = self.keys.keys().copied().collect();
        addrs.sort_unstable();
        addrs
    }

    fn sign(&self, address: &Address, digest: &[u8; 32]) -> Result<[u8; 65], KeychainError> {
        let pair = self
            .keys
            .get(address)
            .ok_or_else(|| KeychainError::UnknownAddress(address.to_cb58()))?;
        Ok(pair.sign_digest(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::ecdsa::RecoveryId;

    fn pair_from_seed(seed: u8) -> KeyPair {
        let mut bytes = [seed; 32];
        bytes[0] = 1; // keep the scalar in range for high seeds
        KeyPair::from_secret_bytes(&bytes).unwrap()
    }

    #[test]
    fn address_is_deterministic() {
        let a = pair_from_seed(7);
        let b = pair_from_seed(7);
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn different_keys_different_addresses() {
        assert_ne!(pair_from_seed(1).address(), pair_from_seed(2).address());
    }

    #[test]
    fn private_key_string_roundtrip() {
        let pair = pair_from_seed(9);
        let s = pair.private_key_string();
        assert!(s.starts_with("PrivateKey-"));
        let restored = KeyPair::from_private_key_string(&s).unwrap();
        assert_eq!(restored.address(), pair.address());
    }

    #[test]
    fn signature_recovers_public_key() {
        let pair = pair_from_seed(3);
        let digest = {
            let d = Sha256::digest(b"payload");
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&d);
            arr
        };
        let sig = pair.sign_digest(&digest);

        let secp = Secp256k1::new();
        let rec_id = RecoveryId::from_i32(sig[64] as i32).unwrap();
        let recoverable =
            RecoverableSignature::from_compact(&sig[..64], rec_id).unwrap();
        let msg = Message::from_digest(digest);
        let recovered = secp.recover_ecdsa(&msg, &recoverable).unwrap();
        assert_eq!(recovered, *pair.public_key());
        assert_eq!(address_from_public_key(&recovered), pair.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let pair = pair_from_seed(5);
        let digest = [0x11u8; 32];
        assert_eq!(pair.sign_digest(&digest), pair.sign_digest(&digest));
    }

    #[test]
    fn keychain_sign_and_lookup() {
        let mut kc = SecpKeyChain::new();
        let addr = kc.import_key(&pair_from_seed(4).private_key_string()).unwrap();
        assert!(kc.has_address(&addr));
        assert!(kc.sign(&addr, &[0u8; 32]).is_ok());

        let stranger = Address::new([0xEE; 20]);
        assert!(!kc.has_address(&stranger));
        assert!(matches!(
            kc.sign(&stranger, &[0u8; 32]),
            Err(KeychainError::UnknownAddress(_))
        ));
    }

    #[test]
    fn keychain_addresses_sorted() {
        let mut kc = SecpKeyChain::new();
        for seed in [9, 2, 6] {
            kc.import_key(&pair_from_seed(seed).private_key_string())
                .unwrap();
        }
        let addrs = kc.addresses();
        assert_eq!(addrs.len(), 3);
        for pair in addrs.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn zero_secret_key_rejected() {
        assert!(KeyPair::from_secret_bytes(&[0u8; 32]).is_err());
        assert!(KeyPair::from_secret_bytes(&[1u8; 16]).is_err());
    }

    #[test]
    fn make_key_generates_unique_addresses() {
        let mut kc = SecpKeyChain::new();
        let a = kc.make_key(&mut rand::thread_rng());
        let b = kc.make_key(&mut rand::thread_rng());
        assert_ne!(a, b);
        assert_eq!(kc.len(), 2);
    }
}
