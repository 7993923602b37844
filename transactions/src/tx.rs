//! A signed transaction: unsigned bytes plus credentials.

use sha2::{Digest, Sha256};

use avax_types::{cb58, ByteReader, ByteWriter, CodecError, TxId};

use crate::credential::Credential;
use crate::unsigned::UnsignedTx;

/// A signed transaction. Wire form:
/// `unsigned bytes ‖ numCreds(4) ‖ credentials`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    pub unsigned: UnsignedTx,
    /// One per input, in input order.
    pub credentials: Vec<Credential>,
}

impl Tx {
    pub fn new(unsigned: UnsignedTx, credentials: Vec<Credential>) -> Self {
        Self {
            unsigned,
            credentials,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(1024);
        w.put_bytes(&self.unsigned.to_bytes());
        w.put_u32(self.credentials.len() as u32);
        for cred in &self.credentials {
            cred.encode(&mut w);
        }
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let unsigned = UnsignedTx::decode(&mut r)?;
        let count = r.read_u32()? as usize;
        let mut credentials = Vec::with_capacity(count);
        for _ in 0..count {
            credentials.push(Credential::decode(&mut r)?);
        }
        r.expect_done()?;
        Ok(Self {
            unsigned,
            credentials,
        })
    }

    /// Transaction id: sha256 of the signed bytes.
    pub fn id(&self) -> TxId {
        let hash = Sha256::digest(self.to_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        TxId::new(bytes)
    }

    /// cb58 form submitted through `issueTx`.
    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58::decode(s)?)
    }
}
