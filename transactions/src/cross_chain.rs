//! Cross-chain transfers through the shared atomic memory.
//!
//! An export locks outputs into the atomic memory addressed to the
//! destination chain; a matching import on that chain consumes them. The
//! same bodies serve both chains — only the transaction type id differs.

use avax_types::{ByteReader, ByteWriter, ChainId, CodecError};

use crate::base::BaseTx;
use crate::codec::Codec;
use crate::input::{sort_transferable_inputs, TransferableInput};
use crate::output::{sort_transferable_outputs, TransferableOutput};

/// Consume UTXOs exported by another chain:
/// `base ‖ sourceChain(32) ‖ numIns(4) ‖ inputs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportTx {
    pub base: BaseTx,
    pub source_chain: ChainId,
    pub import_ins: Vec<TransferableInput>,
}

impl ImportTx {
    pub fn new(base: BaseTx, source_chain: ChainId, mut import_ins: Vec<TransferableInput>) -> Self {
        sort_transferable_inputs(&mut import_ins);
        Self {
            base,
            source_chain,
            import_ins,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        w.put_bytes(self.source_chain.as_bytes());
        w.put_u32(self.import_ins.len() as u32);
        for input in &self.import_ins {
            input.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let source_chain = ChainId::new(r.read_fixed()?);
        let count = r.read_u32()? as usize;
        let mut import_ins = Vec::with_capacity(count);
        for _ in 0..count {
            import_ins.push(TransferableInput::decode(r, codec)?);
        }
        Ok(Self {
            base,
            source_chain,
            import_ins,
        })
    }
}

/// Lock outputs into the atomic memory for another chain:
/// `base ‖ destinationChain(32) ‖ numOuts(4) ‖ outputs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTx {
    pub base: BaseTx,
    pub destination_chain: ChainId,
    pub exported_outs: Vec<TransferableOutput>,
}

impl ExportTx {
    pub fn new(
        base: BaseTx,
        destination_chain: ChainId,
        mut exported_outs: Vec<TransferableOutput>,
    ) -> Self {
        sort_transferable_outputs(&mut exported_outs);
        Self {
            base,
            destination_chain,
            exported_outs,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        w.put_bytes(self.destination_chain.as_bytes());
        w.put_u32(self.exported_outs.len() as u32);
        for out in &self.exported_outs {
            out.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let destination_chain = ChainId::new(r.read_fixed()?);
        let count = r.read_u32()? as usize;
        let mut exported_outs = Vec::with_capacity(count);
        for _ in 0..count {
            exported_outs.push(TransferableOutput::decode(r, codec)?);
        }
        Ok(Self {
            base,
            destination_chain,
            exported_outs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Input, SecpTransferInput, SigIdx};
    use crate::output::Output;
    use avax_types::{Address, AssetId, OutputOwners, TxId};

    fn base() -> BaseTx {
        BaseTx::new(1, ChainId::new([3; 32]), vec![], vec![], vec![]).unwrap()
    }

    fn owners(tag: u8) -> OutputOwners {
        OutputOwners::new(0, 1, vec![Address::new([tag; 20])]).unwrap()
    }

    #[test]
    fn import_roundtrip_sorts_inputs() {
        let mk = |txid: u8| {
            TransferableInput::new(
                TxId::new([txid; 32]),
                0,
                AssetId::new([1; 32]),
                Input::SecpTransfer(SecpTransferInput::new(
                    50,
                    vec![SigIdx::new(0, Address::new([1; 20]))],
                )),
            )
        };
        let tx = ImportTx::new(base(), ChainId::PLATFORM, vec![mk(9), mk(2)]);
        assert_eq!(tx.import_ins[0].tx_id, TxId::new([2; 32]));

        let mut w = ByteWriter::new();
        tx.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        let decoded = ImportTx::decode(&mut r, Codec::Avm).unwrap();
        r.expect_done().unwrap();
        assert_eq!(decoded.source_chain, ChainId::PLATFORM);
        assert_eq!(decoded.import_ins.len(), 2);
    }

    #[test]
    fn export_roundtrip() {
        let out = TransferableOutput::new(
            AssetId::new([1; 32]),
            Output::new_secp_transfer(90, owners(4)),
        );
        let tx = ExportTx::new(base(), ChainId::new([0xCC; 32]), vec![out]);

        let mut w = ByteWriter::new();
        tx.encode(&mut w);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        let decoded = ExportTx::decode(&mut r, Codec::Platform).unwrap();
        r.expect_done().unwrap();
        assert_eq!(decoded.destination_chain, ChainId::new([0xCC; 32]));
        assert_eq!(decoded.exported_outs[0].output.amount(), Some(90));
    }
}
