//! Typed outputs and the transferable-output wrapper.
//!
//! Four output kinds exist: SECP transfer (amount-bearing), SECP mint
//! (authority to mint further fungible supply), NFT transfer (one NFT with
//! its payload), and NFT mint (authority to mint NFTs in a group). Each is
//! tagged with a 32-bit type id on the wire, followed by its payload.

use avax_types::{AssetId, ByteReader, ByteWriter, CodecError, OutputOwners};

use crate::codec::{fx, unknown, Codec};

/// An amount-bearing output: `amount(8) ‖ owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpTransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl SecpTransferOutput {
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u64(self.amount);
        self.owners.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: r.read_u64()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// Authority to mint further supply of a fungible asset: `owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecpMintOutput {
    pub owners: OutputOwners,
}

impl SecpMintOutput {
    pub fn encode(&self, w: &mut ByteWriter) {
        self.owners.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// One NFT: `groupID(4) ‖ payload(var) ‖ owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftTransferOutput {
    pub group_id: u32,
    pub payload: Vec<u8>,
    pub owners: OutputOwners,
}

impl NftTransferOutput {
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.group_id);
        w.put_var_bytes(&self.payload);
        self.owners.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            group_id: r.read_u32()?,
            payload: r.read_var_bytes()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// Authority to mint NFTs within a group: `groupID(4) ‖ owners`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftMintOutput {
    pub group_id: u32,
    pub owners: OutputOwners,
}

impl NftMintOutput {
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.group_id);
        self.owners.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            group_id: r.read_u32()?,
            owners: OutputOwners::decode(r)?,
        })
    }
}

/// A typed output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    SecpTransfer(SecpTransferOutput),
    SecpMint(SecpMintOutput),
    NftTransfer(NftTransferOutput),
    NftMint(NftMintOutput),
}

impl Output {
    /// Convenience constructor for the common amount-bearing case.
    pub fn new_secp_transfer(amount: u64, owners: OutputOwners) -> Self {
        Self::SecpTransfer(SecpTransferOutput { amount, owners })
    }

    pub fn type_id(&self) -> u32 {
        match self {
            Self::SecpTransfer(_) => fx::SECP_TRANSFER_OUTPUT,
            Self::SecpMint(_) => fx::SECP_MINT_OUTPUT,
            Self::NftTransfer(_) => fx::NFT_TRANSFER_OUTPUT,
            Self::NftMint(_) => fx::NFT_MINT_OUTPUT,
        }
    }

    /// Amount carried, for amount-bearing kinds.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Self::SecpTransfer(out) => Some(out.amount),
            _ => None,
        }
    }

    /// NFT group id, for NFT kinds.
    pub fn group_id(&self) -> Option<u32> {
        match self {
            Self::NftTransfer(out) => Some(out.group_id),
            Self::NftMint(out) => Some(out.group_id),
            _ => None,
        }
    }

    /// NFT payload, when present.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::NftTransfer(out) => Some(&out.payload),
            _ => None,
        }
    }

    pub fn owners(&self) -> &OutputOwners {
        match self {
            Self::SecpTransfer(out) => &out.owners,
            Self::SecpMint(out) => &out.owners,
            Self::NftTransfer(out) => &out.owners,
            Self::NftMint(out) => &out.owners,
        }
    }

    /// Write the payload without the type tag.
    pub fn encode_body(&self, w: &mut ByteWriter) {
        match self {
            Self::SecpTransfer(out) => out.encode(w),
            Self::SecpMint(out) => out.encode(w),
            Self::NftTransfer(out) => out.encode(w),
            Self::NftMint(out) => out.encode(w),
        }
    }

    /// Write `type_id(4) ‖ payload`.
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_u32(self.type_id());
        self.encode_body(w);
    }

    /// Read `type_id(4) ‖ payload`, honoring the chain's type table.
    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let tag = r.read_u32()?;
        Self::decode_body(tag, r, codec)
    }

    /// Read a payload whose tag has already been consumed.
    pub fn decode_body(
        tag: u32,
        r: &mut ByteReader<'_>,
        codec: Codec,
    ) -> Result<Self, CodecError> {
        match tag {
            fx::SECP_TRANSFER_OUTPUT => Ok(Self::SecpTransfer(SecpTransferOutput::decode(r)?)),
            fx::SECP_MINT_OUTPUT => Ok(Self::SecpMint(SecpMintOutput::decode(r)?)),
            fx::NFT_TRANSFER_OUTPUT if codec.supports_nft() => {
                Ok(Self::NftTransfer(NftTransferOutput::decode(r)?))
            }
            fx::NFT_MINT_OUTPUT if codec.supports_nft() => {
                Ok(Self::NftMint(NftMintOutput::decode(r)?))
            }
            other => Err(unknown(other)),
        }
    }

    /// Canonical sort key: `type_id(4, big-endian) ‖ payload bytes`.
    pub fn sort_key(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }
}

/// An output bound to the asset it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: AssetId,
    pub output: Output,
}

impl TransferableOutput {
    pub fn new(asset_id: AssetId, output: Output) -> Self {
        Self { asset_id, output }
    }

    /// Wire form: `assetID(32) ‖ type_id(4) ‖ payload`.
    pub fn encode(&self, w: &mut ByteWriter) {
        w.put_bytes(self.asset_id.as_bytes());
        self.output.encode(w);
    }

    pub fn decode(r: &mut ByteReader<'_>, codec: Codec) -> Result<Self, CodecError> {
        let asset_id = AssetId::new(r.read_fixed()?);
        let output = Output::decode(r, codec)?;
        Ok(Self { asset_id, output })
    }
}

/// Sort a transferable-output list into its canonical order.
pub fn sort_transferable_outputs(outs: &mut [TransferableOutput]) {
    outs.sort_by_cached_key(|out| out.output.sort_key());
}
