//! Transaction model and canonical wire codec.
//!
//! Transaction kinds:
//! - **Base**: standard multi-asset transfer on the X chain
//! - **CreateAsset**: define a new fungible or NFT asset family
//! - **Operation**: state-changing operations against existing UTXOs
//!   (mint further supply, mint NFTs, transfer NFTs)
//! - **Import / Export**: move funds across chains through the atomic
//!   memory, in both the X and P flavors
//! - **AddValidator / AddDelegator / AddSubnetValidator**: P-chain staking
//!
//! Every entity here has a deterministic byte form; a transaction id is the
//! sha256 of those bytes, so a single bit wrong changes the id.

pub mod base;
pub mod codec;
pub mod create_asset;
pub mod credential;
pub mod cross_chain;
pub mod error;
pub mod input;
pub mod op;
pub mod output;
pub mod staking;
pub mod tx;
pub mod unsigned;

pub use base::BaseTx;
pub use codec::{Codec, CODEC_VERSION};
pub use create_asset::{CreateAssetTx, InitialState};
pub use credential::Credential;
pub use cross_chain::{ExportTx, ImportTx};
pub use error::TxError;
pub use input::{Input, SecpInput, SecpTransferInput, SigIdx, TransferableInput};
pub use op::{
    NftMintOp, NftTransferOp, Operation, OperationTx, SecpMintOp, TransferableOperation, UtxoId,
};
pub use output::{
    NftMintOutput, NftTransferOutput, Output, SecpMintOutput, SecpTransferOutput,
    TransferableOutput,
};
pub use staking::{AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, Validator};
pub use tx::Tx;
pub use unsigned::UnsignedTx;
