//! Error type shared by every stage of the coin lifecycle.

use thiserror::Error;

/// Result type for coin protocol operations
pub type CashResult<T> = Result<T, CashError>;

/// Coin protocol errors
///
/// Detection outcomes (replay, double-spend, inconclusive) are not errors;
/// see [`crate::detector::DetectionOutcome`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CashError {
    #[error("key length {key} does not match ciphertext length {ciphertext}")]
    LengthMismatch { key: usize, ciphertext: usize },

    #[error("invalid coin signature")]
    InvalidSignature,

    #[error("coin has not been signed by the bank yet")]
    NotYetSigned,

    #[error("coin already carries a bank signature")]
    AlreadySigned,

    #[error("coin signature was already unblinded")]
    AlreadyUnblinded,

    #[error("RIS index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("challenge covers {len} indices, expected {expected}")]
    InvalidChallenge { len: usize, expected: usize },

    #[error("coin value must be positive")]
    InvalidValue,

    #[error("buyer identity must not be empty")]
    EmptyIdentity,

    #[error("malformed coin: {0}")]
    MalformedCoin(String),

    #[error("revealed share {index} does not match its committed hash")]
    ShareHashMismatch { index: usize },

    #[error("RIS sets belong to different coins ({first} vs {second})")]
    CoinMismatch { first: String, second: String },

    #[error("key strength {bits} bits is below the minimum of {minimum}")]
    KeyTooSmall { bits: usize, minimum: usize },

    #[error("key generation failed: {0}")]
    KeyGeneration(#[from] rsa::Error),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
