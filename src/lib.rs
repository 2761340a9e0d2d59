//! Chaumian Coin Simulator Library
//!
//! This library simulates Chaum-style anonymous electronic cash. It supports:
//!
//! - Blindly signed coins: the bank signs without seeing what it signs
//! - Anonymous spending: a single spend reveals nothing about the buyer
//! - Double-spend tracing: two spends of one coin reveal the buyer's identity
//! - Merchant replay detection: identical evidence submitted twice is flagged
//!
//! Every coin embeds `RIS_COUNT` one-time-pad share pairs of the string
//! `IDENT:<buyer>`. A merchant asks for one half of each pair. Two merchants
//! asking for different halves at the same index together hold both halves,
//! and XOR gives the buyer's name back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chaum_coin_sim::{
//!     BankAuthority, Coin, DetectionOutcome, DoubleSpendDetector, Merchant, RsaBlindScheme,
//!     Challenge, Side,
//! };
//!
//! let bank = BankAuthority::issue_key_pair(RsaBlindScheme, 2048)?;
//!
//! // Buyer creates and blinds a coin, bank signs it, buyer unblinds
//! let mut coin = Coin::new(bank.scheme(), "Alice", 20, bank.public_key())?;
//! let blind_sig = bank.sign_blinded(coin.blinded_message())?;
//! coin.request_unblind(bank.scheme(), blind_sig)?;
//!
//! // Alice spends the same coin twice
//! let shop = Merchant::new("Shop", bank.public_key().clone());
//! let first = shop.accept_coin_with_challenge(bank.scheme(), &coin, Challenge::uniform(Side::Left))?;
//! let second = shop.accept_coin_with_challenge(bank.scheme(), &coin, Challenge::uniform(Side::Right))?;
//!
//! let outcome = DoubleSpendDetector::new().detect(&first.ris, &second.ris)?;
//! assert_eq!(outcome, DetectionOutcome::DoubleSpendDetected { identity: "Alice".into() });
//! # Ok::<(), chaum_coin_sim::CashError>(())
//! ```

pub mod bank;
pub mod blind;
pub mod coin;
pub mod crypto;
pub mod detector;
pub mod error;
pub mod identity;
pub mod merchant;
pub mod otp;
pub mod simulation;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types
pub use types::{
    Bytes32,
    Challenge,
    RevealedShare,
    RisSet,
    Side,
    RIS_COUNT,
};

pub use error::{CashError, CashResult};

pub use blind::{
    BankKeyPair,
    BankPublicKey,
    BlindSignature,
    BlindSignatureScheme,
    BlindedMessage,
    RsaBlindScheme,
    Signature,
};

pub use bank::{verify_coin_format, BankAuthority};
pub use coin::{Coin, CoinFields, CoinState};
pub use detector::{DetectionOutcome, DoubleSpendDetector};
pub use identity::IdentityCommitment;
pub use merchant::{ChallengeStrategy, Merchant, SpendReceipt};
pub use otp::OneTimePad;
pub use simulation::{ChallengeMode, SimulationConfig, SimulationReport};
