use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("no key for address {0}")]
    UnknownAddress(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}
