//! Wire type-id tables.
//!
//! A 32-bit type id precedes every tagged payload. The feature-extension
//! ids are shared by both chains; transaction-level ids are per chain. NFT
//! types are only registered on the X chain — the P chain reuses ids 10
//! and 11 for its bare input and standalone owner set, which never appear
//! in output or input positions there.

use avax_types::CodecError;

/// Codec version prefixed to every serialized transaction and UTXO.
pub const CODEC_VERSION: u16 = 0;

/// Which chain's type-id table governs a (de)serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Avm,
    Platform,
}

impl Codec {
    /// NFT types are only registered on the X chain.
    pub fn supports_nft(self) -> bool {
        matches!(self, Codec::Avm)
    }
}

/// Feature-extension type ids (outputs, inputs, operations, credentials).
pub mod fx {
    pub const SECP_TRANSFER_INPUT: u32 = 5;
    pub const SECP_MINT_OUTPUT: u32 = 6;
    pub const SECP_TRANSFER_OUTPUT: u32 = 7;
    pub const SECP_MINT_OP: u32 = 8;
    pub const SECP_CREDENTIAL: u32 = 9;
    pub const NFT_MINT_OUTPUT: u32 = 10;
    pub const NFT_TRANSFER_OUTPUT: u32 = 11;
    pub const NFT_MINT_OP: u32 = 12;
    pub const NFT_TRANSFER_OP: u32 = 13;
    pub const NFT_CREDENTIAL: u32 = 14;
}

/// X-chain transaction type ids.
pub mod avm {
    pub const BASE_TX: u32 = 0;
    pub const CREATE_ASSET_TX: u32 = 1;
    pub const OPERATION_TX: u32 = 2;
    pub const IMPORT_TX: u32 = 3;
    pub const EXPORT_TX: u32 = 4;
}

/// P-chain transaction and auxiliary type ids.
pub mod platform {
    pub const ADD_VALIDATOR_TX: u32 = 12;
    pub const ADD_SUBNET_VALIDATOR_TX: u32 = 13;
    pub const ADD_DELEGATOR_TX: u32 = 14;
    pub const IMPORT_TX: u32 = 17;
    pub const EXPORT_TX: u32 = 18;
    /// Bare signature-index input, used for subnet auth.
    pub const SECP_INPUT: u32 = 10;
    /// Standalone owner set, used for staking reward owners.
    pub const SECP_OWNER_OUTPUT: u32 = 11;
}

/// Reject type ids that are not valid in the given position.
pub fn unknown(id: u32) -> CodecError {
    CodecError::UnknownTypeId(id)
}
