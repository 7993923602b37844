//! Typed inputs and the transferable-input wrapper.
//!
//! An input spends a previous output by naming the UTXO it consumes and
//! the indices (into that output's owner list) of the addresses that will
//! sign. The signer address is kept next to each index at build time so
//! the signing pass can find keys after the inputs have been sorted; only
//! the index goes on the wire.

use avax_types::{Address, AssetId, ByteReader, ByteWriter, CodecError, TxId};

use crate::codec::{fx, unknown, Codec};

/// One signature slot: a position in the consumed output's owner list,
/// plus (build-time only) the address that occupies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigIdx {
    pub index: u32,
    /// `None` on inputs parsed from the wire.
    pub address: Option<Address>,
}

impl SigIdx {
    pub fn new(index: u32, address: Address) -> Self {
        Self {
            index,
            address: Some(address),
        }
    }
}

/// A bare list of signature indices, ascending and unique.
///
/// Embedded in amount inputs, mint operations, and subnet auth.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SecpInput {
    pub sig_idxs: Vec<SigIdx>,
}

impl SecpInput {
    pub fn new(mut sig_idxs: Vec<SigIdx>) -> Self {
        sig_idxs.sort_by_key(|s| s.index);
        sig_idxs.dedup_by_key(|s| s.index);
        Self { sig_idxs }
    }

    /// Build-time signer addresses, in index order.
    pub fn signers(&self) -> Vec<Option<Address>> {
        self.sig_idxs.iter().map(|s| s.address).collect()
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.sig_idxs.len() as u32);
        for sig in &self.sig_idxs {
            w.put_u32(sig.index);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let count = r.read_u32()? as usize;
        let mut sig_idxs = Vec::with_capacity(count);
        for _ in 0..count {
            sig_idxs.push(SigIdx {
                index: r.read_u32()?,
                address: None,
            });
        }
        Ok(Self { sig_idxs })
    }
}

/// An amount-consuming input: `amount(8) ‖ sigIdx count(4) ‖ indices`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpTransferInput {
    pub amount: u64,
    pub input: SecpInput,
}

impl SecpTransferInput {
    pub fn new(amount: u64, sig_idxs: Vec<SigIdx>) -> Self {
        Self {
            amount,
            input: SecpInput::new(sig_idxs),
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u64(self.amount);
        self.input.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: r.read_u64()?,
            input: SecpInput::decode(r)?,
        })
    }
}

/// A typed input. Only amount-consuming inputs appear in transferable
/// positions; mint and NFT spends are expressed as operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    SecpTransfer(SecpTransferInput),
}

impl Input {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(_) => fx::SECP_TRANSFER_INPUT,
        }
    }

    /// Amount consumed by this input.
    pub fn amount(&self) -> u64 {
        match self {
            Self::SecpTransfer(input) => input.amount,
        }
    }

    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Self::SecpTransfer(input) => &input.input.sig_idxs,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.type_id());
        match self {
            Self::SecpTransfer(input) => input.encode(w),
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, CodecError> {
        let tag = r.read_u32()?;
        match tag {
            fx::SECP_TRANSFER_INPUT => Ok(Self::SecpTransfer(SecpTransferInput::decode(r)?)),
            other => Err(unknown(other)),
        }
    }
}

/// An input bound to the UTXO it consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableInput {
    pub tx_id: TxId,
    pub output_index: u32,
    pub asset_id: AssetId,
    pub input: Input,
}

impl TransferableInput {
    pub fn new(tx_id: TxId, output_index: u32, asset_id: AssetId, input: Input) -> Self {
        Self {
            tx_id,
            output_index,
            asset_id,
            input,
        }
    }

    /// Wire form: `txID(32) ‖ outputIdx(4) ‖ assetID(32) ‖ input`.
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_bytes(self.tx_id.as_bytes());
        w.put_u32(self.output_index);
        w.put_bytes(self.asset_id.as_bytes());
        self.input.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        Ok(Self {
            tx_id: TxId::new(r.read_fixed()?),
            output_index: r.read_u32()?,
            asset_id: AssetId::new(r.read_fixed()?),
            input: Input::decode(r, codec)?,
        })
    }
}

/// Sort a transferable-input list by `(txID ‖ outputIdx)` ascending.
pub fn sort_transferable_inputs(ins: &mut [TransferableInput]) {
    ins.sort_by(|a, b| {
        a.tx_id
            .cmp(&b.tx_id)
            .then(a.output_index.cmp(&b.output_index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::new([tag; 20])
    }

    #[test]
    fn sig_idxs_sorted_unique() {
        let input = SecpInput::new(vec![
            SigIdx::new(2, addr(2)),
            SigIdx::new(0, addr(0)),
            SigIdx::new(2, addr(2)),
        ]);
        let indices: Vec<u32> = input.sig_idxs.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn input_roundtrip_drops_addresses() {
        let input = Input::SecpTransfer(SecpTransferInput::new(
            999,
            vec![SigIdx::new(0, addr(1)), SigIdx::new(3, addr(4))],
        ));
        let mut w = ByteWriter::new();
        input.encode(&mut w);
        let bytes = w.into_bytes();
        // tag(4) ‖ amount(8) ‖ count(4) ‖ 2 indices(8)
        assert_eq!(bytes.len(), 4 + 8 + 4 + 8);

        let decoded = Input::decode(&mut ByteReader::new(&bytes), Codec::Avm).unwrap();
        assert_eq!(decoded.amount(), 999);
        let indices: Vec<u32> = decoded.sig_idxs().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 3]);
        assert!(decoded.sig_idxs().iter().all(|s| s.address.is_none()));
    }

    #[test]
    fn transferable_input_roundtrip() {
        let tin = TransferableInput::new(
            TxId::new([8; 32]),
            2,
            AssetId::new([5; 32]),
            Input::SecpTransfer(SecpTransferInput::new(100, vec![SigIdx::new(0, addr(1))])),
        );
        let mut w = ByteWriter::new();
        tin.encode(&mut w);
        let bytes = w.into_bytes();
        let decoded = TransferableInput::decode(&mut ByteReader::new(&bytes), Codec::Avm).unwrap();
        assert_eq!(decoded.tx_id, tin.tx_id);
        assert_eq!(decoded.output_index, 2);
        assert_eq!(decoded.asset_id, tin.asset_id);
        assert_eq!(decoded.input.amount(), 100);
    }

    #[test]
    fn inputs_sort_by_txid_then_index() {
        let mk = |txid: u8, idx: u32| {
            TransferableInput::new(
                TxId::new([txid; 32]),
                idx,
                AssetId::new([0; 32]),
                Input::SecpTransfer(SecpTransferInput::new(1, vec![])),
            )
        };
        let mut ins = vec![mk(2, 0), mk(1, 5), mk(1, 1)];
        sort_transferable_inputs(&mut ins);
        assert_eq!(
            ins.iter()
                .map(|i| (i.tx_id.as_bytes()[0], i.output_index))
                .collect::<Vec<_>>(),
            vec![(1, 1), (1, 5), (2, 0)]
        );
    }

    #[test]
    fn unknown_input_tag_rejected() {
        let mut w = ByteWriter::new();
        w.put_u32(6); // mint-output tag is not a valid input tag
        let bytes = w.into_bytes();
        assert_eq!(
            Input::decode(&mut ByteReader::new(&bytes), Codec::Avm).unwrap_err(),
            CodecError::UnknownTypeId(6)
        );
    }
}
