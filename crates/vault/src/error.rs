use thiserror::Error;

/// C1 failure modes (§7). Never surfaced to the LLM — fatal for the affected
/// resource and mapped to HTTP 500 by the gateway.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("ciphertext is not in the expected `part:part[:part]` hex format")]
    CryptoInvalidFormat,

    #[error("authentication tag did not verify")]
    CryptoAuthFail,

    #[error("missing secret: {0}")]
    MissingSecret(String),

    #[error("invalid hex in ciphertext: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, VaultError>;
