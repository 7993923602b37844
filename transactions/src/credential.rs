//! Per-input signature bundles.
//!
//! A signed transaction carries one credential per input, in input order.
//! Wire form: `type_id(4) ‖ numSigs(4) ‖ 65-byte signatures`.

use avax_types::{ByteReader, ByteWriter, CodecError};

use crate::codec::{fx, unknown};

/// A 65-byte recoverable signature: r ‖ s ‖ v.
pub type Signature = [u8; 65];

/// A credential proving authority over one input.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Secp(Vec<Signature>),
    Nft(Vec<Signature>),
}

impl Credential {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::Secp(_) => fx::SECP_CREDENTIAL,
            Self::Nft(_) => fx::NFT_CREDENTIAL,
        }
    }

    pub fn signatures(&self) -> &[Signature] {
        match self {
            Self::Secp(sigs) | Self::Nft(sigs) => sigs,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.type_id());
        let sigs = self.signatures();
        w.put_u32(sigs.len() as u32);
        for sig in sigs {
            w.put_bytes(sig);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_u32()?;
        let count = r.read_u32()? as usize;
        let mut sigs = Vec::with_capacity(count);
        for _ in 0..count {
            sigs.push(r.read_fixed()?);
        }
        match tag {
            fx::SECP_CREDENTIAL => Ok(Self::Secp(sigs)),
            fx::NFT_CREDENTIAL => Ok(Self::Nft(sigs)),
            other => Err(unknown(other)),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Secp(_) => "Secp",
            Self::Nft(_) => "Nft",
        };
        write!(f, "Credential::{}({} sigs)", kind, self.signatures().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secp_roundtrip() {
        let cred = Credential::Secp(vec![[0xAB; 65], [0xCD; 65]]);
        let mut w = ByteWriter::new();
        cred.encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 4 + 4 + 2 * 65);
        assert_eq!(&bytes[..4], &[0, 0, 0, 9]);

        let decoded = Credential::decode(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(decoded, cred);
    }

    #[test]
    fn nft_roundtrip() {
        let cred = Credential::Nft(vec![[1; 65]]);
        let mut w = ByteWriter::new();
        cred.encode(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &[0, 0, 0, 14]);
        assert_eq!(Credential::decode(&mut ByteReader::new(&bytes)).unwrap(), cred);
    }

    #[test]
    fn unknown_credential_tag_rejected() {
        let mut w = ByteWriter::new();
        w.put_u32(7);
        w.put_u32(0);
        let bytes = w.into_bytes();
        assert_eq!(
            Credential::decode(&mut ByteReader::new(&bytes)).unwrap_err(),
            CodecError::UnknownTypeId(7)
        );
    }

    #[test]
    fn truncated_signature_rejected() {
        let mut w = ByteWriter::new();
        w.put_u32(fx::SECP_CREDENTIAL);
        w.put_u32(1);
        w.put_bytes(&[0u8; 10]);
        let bytes = w.into_bytes();
        assert!(matches!(
            Credential::decode(&mut ByteReader::new(&bytes)),
            Err(CodecError::TruncatedBuffer { .. })
        ));
    }
}
