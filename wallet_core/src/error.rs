use thiserror::Error;

use avax_transactions::TxError;
use avax_types::CodecError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds for asset {asset}: short {shortfall}")]
    InsufficientFunds { asset: String, shortfall: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("spender address not in owner set")]
    SpenderMismatch,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("persistence error: {0}")]
    Persistence(String),
}
