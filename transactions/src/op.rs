//! State-changing operations against existing UTXOs, and the operation
//! transaction that carries them.
//!
//! Operations spend non-amount outputs: a SECP mint operation consumes a
//! mint output to issue more fungible supply, an NFT mint operation
//! consumes an NFT mint output to create NFTs in its group, and an NFT
//! transfer operation moves an NFT to new owners.

use avax_types::{AssetId, ByteReader, ByteWriter, CodecError, OutputOwners, TxId};

use crate::base::BaseTx;
use crate::codec::{fx, unknown, Codec};
use crate::input::SecpInput;
use crate::output::{NftTransferOutput, SecpMintOutput, SecpTransferOutput};

/// Reference to one UTXO: `txID(32) ‖ outputIdx(4)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtxoId {
    pub tx_id: TxId,
    pub output_index: u32,
}

impl UtxoId {
    pub fn new(tx_id: TxId, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_bytes(self.tx_id.as_bytes());
        w.put_u32(self.output_index);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx_id: TxId::new(r.read_fixed()?),
            output_index: r.read_u32()?,
        })
    }
}

/// Mint further supply of a fungible asset.
///
/// Consumes a mint output; reproduces it (so the authority survives) and
/// issues a new transfer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpMintOp {
    pub input: SecpInput,
    pub mint_output: SecpMintOutput,
    pub transfer_output: SecpTransferOutput,
}

impl SecpMintOp {
    pub fn encode(&self, w: &mut ByteWriter) {
        self.input.encode(w);
        self.mint_output.encode(w);
        self.transfer_output.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            input: SecpInput::decode(r)?,
            mint_output: SecpMintOutput::decode(r)?,
            transfer_output: SecpTransferOutput::decode(r)?,
        })
    }
}

/// Mint NFTs within a group: `input ‖ groupID(4) ‖ payload(var) ‖ owner sets`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftMintOp {
    pub input: SecpInput,
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub outputs: Vec<OutputOwners>,
}

impl NftMintOp {
    pub fn encode(&self, w: &mut ByteWriter) {
        self.input.encode(w);
        w.put_u32(self.group_id);
        w.put_var_bytes(&self.payload);
        w.put_u32(self.outputs.len() as u32);
        for owners in &self.outputs {
            owners.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let input = SecpInput::decode(r)?;
        let group_id = r.read_u32()?;
        let payload = r.read_var_bytes()?;
        let count = r.read_u32()? as usize;
        let mut outputs = Vec::with_capacity(count);
        for _ in 0..count {
            outputs.push(OutputOwners::decode(r)?);
        }
        Ok(Self {
            input,
            group_id,
            payload,
            outputs,
        })
    }
}

/// Move an NFT to new owners: `input ‖ nft transfer output body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftTransferOp {
    pub input: SecpInput,
    pub output: NftTransferOutput,
}

impl NftTransferOp {
    pub fn encode(&self, w: &mut ByteWriter) {
        self.input.encode(w);
        self.output.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            input: SecpInput::decode(r)?,
            output: NftTransferOutput::decode(r)?,
        })
    }
}

/// A typed operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    SecpMint(SecpMintOp),
    NftMint(NftMintOp),
    NftTransfer(NftTransferOp),
}

impl Operation {
    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpMint(_) => fx::SECP_MINT_OP,
            Self::NftMint(_) => fx::NFT_MINT_OP,
            Self::NftTransfer(_) => fx::NFT_TRANSFER_OP,
        }
    }

    /// The signature slots this operation consumes.
    pub fn input(&self) -> &SecpInput {
        match self {
            Self::SecpMint(op) => &op.input,
            Self::NftMint(op) => &op.input,
            Self::NftTransfer(op) => &op.input,
        }
    }

    /// Whether this operation's credential uses the NFT tag.
    pub fn is_nft(&self) -> bool {
        !matches!(self, Self::SecpMint(_))
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.type_id());
        match self {
            Self::SecpMint(op) => op.encode(w),
            Self::NftMint(op) => op.encode(w),
            Self::NftTransfer(op) => op.encode(w),
        }
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let tag = r.read_u32()?;
        match tag {
            fx::SECP_MINT_OP => Ok(Self::SecpMint(SecpMintOp::decode(r)?)),
            fx::NFT_MINT_OP => Ok(Self::NftMint(NftMintOp::decode(r)?)),
            fx::NFT_TRANSFER_OP => Ok(Self::NftTransfer(NftTransferOp::decode(r)?)),
            other => Err(unknown(other)),
        }
    }
}

/// An operation bound to the asset and source UTXOs it acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableOperation {
    pub asset_id: AssetId,
    /// Ascending by `(txID, outputIdx)`.
    pub utxo_ids: Vec<UtxoId>,
    pub op: Operation,
}

impl TransferableOperation {
    pub fn new(asset_id: AssetId, mut utxo_ids: Vec<UtxoId>, op: Operation) -> Self {
        utxo_ids.sort_unstable();
        Self {
            asset_id,
            utxo_ids,
            op,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_bytes(self.asset_id.as_bytes());
        w.put_u32(self.utxo_ids.len() as u32);
        for id in &self.utxo_ids {
            id.encode(w);
        }
        self.op.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let asset_id = AssetId::new(r.read_fixed()?);
        let count = r.read_u32()? as usize;
        let mut utxo_ids = Vec::with_capacity(count);
        for _ in 0..count {
            utxo_ids.push(UtxoId::decode(r)?);
        }
        let op = Operation::decode(r)?;
        Ok(Self {
            asset_id,
            utxo_ids,
            op,
        })
    }
}

/// Sort operations by their first source UTXO id.
pub fn sort_operations(ops: &mut [TransferableOperation]) {
    ops.sort_by_key(|op| op.utxo_ids.first().copied());
}

/// An X-chain transaction carrying operations: `base ‖ numOps(4) ‖ ops`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationTx {
    pub base: BaseTx,
    pub ops: Vec<TransferableOperation>,
}

impl OperationTx {
    pub fn new(base: BaseTx, mut ops: Vec<TransferableOperation>) -> Self {
        sort_operations(&mut ops);
        Self { base, ops }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        self.base.encode(w);
        w.put_u32(self.ops.len() as u32);
        for op in &self.ops {
            op.encode(w);
        }
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let base = BaseTx::decode(r, codec)?;
        let count = r.read_u32()? as usize;
        let mut ops = Vec::with_capacity(count);
        for _ in 0..count {
            ops.push(TransferableOperation::decode(r)?);
        }
        Ok(Self { base, ops })
    }
}
