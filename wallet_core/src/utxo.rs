//! The unspent-output record.

use avax_transactions::{Codec, Output, UtxoId, CODEC_VERSION};
use avax_types::{cb58, AssetId, ByteReader, ByteWriter, CodecError, TxId};

/// One unspent output. Wire form:
/// `codecID(2) ‖ txID(32) ‖ outputIdx(4) ‖ assetID(32) ‖ tagged output`.
/// The string form is cb58 of those bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub codec_id: u16,
    pub tx_id: TxId,
    pub output_index: u32,
    pub asset_id: AssetId,
    pub output: Output,
}

impl Utxo {
    pub fn new(tx_id: TxId, output_index: u32, asset_id: AssetId, output: Output) -> Self {
        Self {
            codec_id: CODEC_VERSION,
            tx_id,
            output_index,
            asset_id,
            output,
        }
    }

    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u16(self.codec_id);
        w.put_bytes(self.tx_id.as_bytes());
        w.put_u32(self.output_index);
        w.put_bytes(self.asset_id.as_bytes());
        self.output.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let codec_id = r.read_u16()?;
        if codec_id != CODEC_VERSION {
            return Err(CodecError::UnsupportedCodec(codec_id));
        }
        Ok(Self {
            codec_id,
            tx_id: TxId::new(r.read_fixed()?),
            output_index: r.read_u32()?,
            asset_id: AssetId::new(r.read_fixed()?),
            output: Output::decode(r, codec)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(128);
        self.encode(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8], codec: Codec) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let utxo = Self::decode(&mut r, codec)?;
        r.expect_done()?;
        Ok(utxo)
    }

    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    pub fn from_cb58(s: &str, codec: Codec) -> Result<Self, CodecError> {
        Self::from_bytes(&cb58::decode(s)?, codec)
    }
}
