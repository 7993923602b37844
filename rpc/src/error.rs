use thiserror::Error;

use avax_transactions::TxError;
use avax_types::CodecError;
use avax_wallet_core::WalletError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transaction fee {fee} is implausibly large")]
    GooseEgg { fee: u128 },

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("state error: {0}")]
    State(String),
}
