use thiserror::Error;

use avax_keychain::KeychainError;
use avax_types::CodecError;

#[derive(Debug, Error)]
pub enum TxError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Keychain(#[from] KeychainError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("state error: {0}")]
    State(String),
}
