//! The common transaction body every kind embeds.
//!
//! Wire form: `networkID(4) ‖ blockchainID(32) ‖ outs ‖ ins ‖ memo(var)`.
//! Outputs and inputs are canonically sorted before any digest is taken.

use avax_types::network::MEMO_MAX_LEN;
use avax_types::{AssetId, ByteReader, ByteWriter, ChainId, CodecError};

use crate::codec::Codec;
use crate::error::TxError;
use crate::input::{sort_transferable_inputs, TransferableInput};
use crate::output::{sort_transferable_outputs, TransferableOutput};

/// The body shared by every transaction kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: ChainId,
    pub outs: Vec<TransferableOutput>,
    pub ins: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    /// Assemble a base body, sorting outputs and inputs into canonical
    /// order. Fails if the memo exceeds the protocol limit.
    pub fn new(
        network_id: u32,
        blockchain_id: ChainId,
        mut outs: Vec<TransferableOutput>,
        mut ins: Vec<TransferableInput>,
        memo: Vec<u8>,
    ) -> Result<Self, TxError> {
        if memo.len() > MEMO_MAX_LEN {
            return Err(TxError::InvalidInput(format!(
                "memo is {} bytes, maximum is {}",
                memo.len(),
                MEMO_MAX_LEN
            )));
        }
        sort_transferable_outputs(&mut outs);
        sort_transferable_inputs(&mut ins);
        Ok(Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }

    /// Sum of input amounts for one asset.
    pub fn input_total(&self, asset_id: &AssetId) -> u128 {
        self.ins
            .iter()
            .filter(|i| i.asset_id == *asset_id)
            .map(|i| i.input.amount() as u128)
            .sum()
    }

    /// Sum of output amounts for one asset.
    pub fn output_total(&self, asset_id: &AssetId) -> u128 {
        self.outs
            .iter()
            .filter(|o| o.asset_id == *asset_id)
            .filter_map(|o| o.output.amount())
            .map(|a| a as u128)
            .sum()
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.network_id);
        w.put_bytes(self.blockchain_id.as_bytes());
        w.put_u32(self.outs.len() as u32);
        for out in &self.outs {
            out.encode(w);
        }
        w.put_u32(self.ins.len() as u32);
        for input in &self.ins {
            input.encode(w);
        }
        w.put_var_bytes(&self.memo);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let network_id = r.read_u32()?;
        let blockchain_id = ChainId::new(r.read_fixed()?);
        let out_count = r.read_u32()? as usize;
        let mut outs = Vec::with_capacity(out_count);
        for _ in 0..out_count {
            outs.push(TransferableOutput::decode(r, codec)?);
        }
        let in_count = r.read_u32()? as usize;
        let mut ins = Vec::with_capacity(in_count);
        for _ in 0..in_count {
            ins.push(TransferableInput::decode(r, codec)?);
        }
        let memo = r.read_var_bytes()?;
        Ok(Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }
}
