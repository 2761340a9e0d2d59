//! Merchant side of a spend.
//!
//! A merchant checks the bank's signature over the coin, challenges the buyer
//! for one half of every identity share pair, and keeps the revealed shares
//! (the RIS set) as evidence. Merchants keep no state between spends; a second
//! spend of the same coin is never refused, only detectable afterwards.

use serde::{Deserialize, Serialize};

use crate::bank::verify_coin_format;
use crate::blind::{BankPublicKey, BlindSignatureScheme};
use crate::coin::{Coin, CoinFields};
use crate::crypto::hash_hex;
use crate::error::{CashError, CashResult};
use crate::types::{Challenge, RevealedShare, RisSet, Side, RIS_COUNT};

/// How a merchant draws its challenge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStrategy {
    /// One coin flip picks the same side for every index
    #[default]
    Uniform,
    /// An independent coin flip per index
    PerIndex,
}

impl ChallengeStrategy {
    pub fn draw(self) -> Challenge {
        match self {
            ChallengeStrategy::Uniform => Challenge::random_uniform(),
            ChallengeStrategy::PerIndex => Challenge::random_per_index(),
        }
    }
}

/// What a merchant keeps after accepting a coin
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub merchant: String,
    pub value: u64,
    pub challenge: Challenge,
    pub ris: RisSet,
}

#[derive(Clone, Debug)]
pub struct Merchant {
    name: String,
    bank_public_key: BankPublicKey,
    strategy: ChallengeStrategy,
}

impl Merchant {
    pub fn new(name: impl Into<String>, bank_public_key: BankPublicKey) -> Self {
        Self {
            name: name.into(),
            bank_public_key,
            strategy: ChallengeStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ChallengeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> ChallengeStrategy {
        self.strategy
    }

    /// Verify the coin, then draw a challenge and collect its RIS
    pub fn accept_coin<S: BlindSignatureScheme>(
        &self,
        scheme: &S,
        coin: &Coin,
    ) -> CashResult<SpendReceipt> {
        self.verify_signature(scheme, coin)?;
        self.collect_ris(coin, self.strategy.draw())
    }

    /// Verify the coin and collect its RIS under `challenge`
    pub fn accept_coin_with_challenge<S: BlindSignatureScheme>(
        &self,
        scheme: &S,
        coin: &Coin,
        challenge: Challenge,
    ) -> CashResult<SpendReceipt> {
        self.verify_signature(scheme, coin)?;
        self.collect_ris(coin, challenge)
    }

    fn verify_signature<S: BlindSignatureScheme>(&self, scheme: &S, coin: &Coin) -> CashResult<()> {
        let signature = coin.signature().ok_or(CashError::InvalidSignature)?;
        if !scheme.verify(coin.serialize().as_bytes(), signature, &self.bank_public_key) {
            return Err(CashError::InvalidSignature);
        }
        Ok(())
    }

    fn collect_ris(&self, coin: &Coin, challenge: Challenge) -> CashResult<SpendReceipt> {
        if challenge.len() != RIS_COUNT {
            return Err(CashError::InvalidChallenge {
                len: challenge.len(),
                expected: RIS_COUNT,
            });
        }

        let fields = verify_coin_format(coin.serialize())?;

        let mut shares = Vec::with_capacity(RIS_COUNT);
        for (index, side) in challenge.sides().iter().copied().enumerate() {
            let bytes = coin.reveal_share(side, index)?;
            check_share(&fields, side, index, bytes)?;
            shares.push(RevealedShare {
                index,
                side,
                bytes: bytes.to_vec(),
            });
        }

        Ok(SpendReceipt {
            merchant: self.name().to_string(),
            value: fields.value,
            challenge,
            ris: RisSet::new(coin.id().to_string(), shares),
        })
    }
}

/// A revealed share must hash to the digest signed into the coin
fn check_share(fields: &CoinFields, side: Side, index: usize, bytes: &[u8]) -> CashResult<()> {
    match fields.hash_for(side, index) {
        Some(expected) if expected == hash_hex(bytes) => Ok(()),
        _ => Err(CashError::ShareHashMismatch { index }),
    }
}
