//! Checksummed base-58 ("cb58") encoding.
//!
//! Identifiers (transaction ids, asset ids, UTXO ids, private keys) are
//! rendered as base-58 of `payload ‖ sha256(payload)[28..32]`. Decoding
//! verifies the 4-byte checksum suffix.

use sha2::{Digest, Sha256};

use crate::error::CodecError;

/// Length of the sha256 suffix appended before base-58 encoding.
const CHECKSUM_LEN: usize = 4;

/// Encode a payload as checksummed base-58.
pub fn encode(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    bs58::encode(data).into_string()
}

/// Decode a checksummed base-58 string, verifying the checksum suffix.
pub fn decode(s: &str) -> Result<Vec<u8>, CodecError> {
    let data = bs58::decode(s)
        .into_vec()
        .map_err(|e| CodecError::Base58(e.to_string()))?;
    if data.len() < CHECKSUM_LEN {
        return Err(CodecError::InvalidLength {
            expected: CHECKSUM_LEN,
            got: data.len(),
        });
    }
    let (payload, checksum) = data.split_at(data.len() - CHECKSUM_LEN);
    let digest = Sha256::digest(payload);
    if checksum != &digest[digest.len() - CHECKSUM_LEN..] {
        return Err(CodecError::BadChecksum);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_single_byte() {
        let encoded = encode(b"A");
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, b"A");
    }

    #[test]
    fn roundtrip_32_bytes() {
        let payload = [0x5Cu8; 32];
        let decoded = decode(&encode(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn checksum_is_sha256_suffix() {
        // encode("A") must be base58 of "A" followed by sha256("A")[28..32].
        let digest = Sha256::digest(b"A");
        let mut raw = b"A".to_vec();
        raw.extend_from_slice(&digest[28..32]);
        assert_eq!(encode(b"A"), bs58::encode(raw).into_string());
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let payload = [7u8; 32];
        let digest = Sha256::digest(payload);
        for i in 0..CHECKSUM_LEN {
            let mut raw = payload.to_vec();
            raw.extend_from_slice(&digest[28..32]);
            let idx = payload.len() + i;
            raw[idx] ^= 0x01;
            let tampered = bs58::encode(raw).into_string();
            assert_eq!(decode(&tampered), Err(CodecError::BadChecksum));
        }
    }

    #[test]
    fn too_short_rejected() {
        // Fewer than 4 decoded bytes cannot carry a checksum.
        let short = bs58::encode([1u8, 2]).into_string();
        assert!(matches!(
            decode(&short),
            Err(CodecError::InvalidLength { .. })
        ));
    }

    #[test]
    fn invalid_alphabet_rejected() {
        assert!(matches!(decode("0OIl"), Err(CodecError::Base58(_))));
    }

    #[test]
    fn empty_payload_roundtrips() {
        let encoded = encode(b"");
        assert_eq!(decode(&encoded).unwrap(), Vec::<u8>::new());
    }
}
