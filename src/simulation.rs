//! Scenario orchestration for the coin protocol.
//!
//! This is the layer that talks: every protocol step is logged with `tracing`,
//! and the run is summarised in a serializable [`SimulationReport`]. The
//! protocol modules themselves stay silent.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::bank::{BankAuthority, DEFAULT_KEY_BITS};
use crate::blind::{BlindSignatureScheme, RsaBlindScheme, MIN_KEY_BITS};
use crate::coin::Coin;
use crate::detector::{DetectionOutcome, DoubleSpendDetector};
use crate::error::{CashError, CashResult};
use crate::merchant::{ChallengeStrategy, Merchant, SpendReceipt};
use crate::types::{Challenge, Side};

/// How merchants in the scenario pick their challenges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeMode {
    /// One random bit per spend
    Uniform,
    /// One random bit per index
    #[default]
    PerIndex,
    /// All-left on the first spend, all-right on the second
    Alternating,
}

impl ChallengeMode {
    fn challenge_for(self, spend: usize) -> Challenge {
        match self {
            ChallengeMode::Uniform => ChallengeStrategy::Uniform.draw(),
            ChallengeMode::PerIndex => ChallengeStrategy::PerIndex.draw(),
            ChallengeMode::Alternating if spend % 2 == 0 => Challenge::uniform(Side::Left),
            ChallengeMode::Alternating => Challenge::uniform(Side::Right),
        }
    }
}

/// Scenario parameters. Missing JSON fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub buyer: String,
    pub value: u64,
    pub key_bits: usize,
    /// How many merchants the coin is presented to (1 or 2)
    pub spends: u8,
    pub challenge: ChallengeMode,
    /// Also compare the first RIS set against itself
    pub check_merchant_replay: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            buyer: "Alice".to_string(),
            value: 20,
            key_bits: DEFAULT_KEY_BITS,
            spends: 2,
            challenge: ChallengeMode::default(),
            check_merchant_replay: true,
        }
    }
}

impl SimulationConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> CashResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> CashResult<()> {
        if self.buyer.is_empty() {
            return Err(CashError::Config("buyer must not be empty".to_string()));
        }
        if self.value == 0 {
            return Err(CashError::Config("value must be positive".to_string()));
        }
        if self.key_bits < MIN_KEY_BITS {
            return Err(CashError::Config(format!(
                "key_bits must be at least {}",
                MIN_KEY_BITS
            )));
        }
        if !(1..=2).contains(&self.spends) {
            return Err(CashError::Config(format!(
                "spends must be 1 or 2, got {}",
                self.spends
            )));
        }
        Ok(())
    }
}

/// One merchant acceptance, as reported
#[derive(Clone, Debug, Serialize)]
pub struct SpendSummary {
    pub merchant: String,
    pub challenge: String,
}

impl From<&SpendReceipt> for SpendSummary {
    fn from(receipt: &SpendReceipt) -> Self {
        Self {
            merchant: receipt.merchant.clone(),
            challenge: receipt.challenge.summary(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub coin_id: String,
    pub buyer: String,
    pub value: u64,
    pub bank_key_fingerprint: String,
    pub spends: Vec<SpendSummary>,
    /// `None` when the coin was spent only once
    pub double_spend: Option<DetectionOutcome>,
    pub merchant_replay: Option<DetectionOutcome>,
}

/// Generate a bank key and run the scenario
pub fn run(config: &SimulationConfig) -> CashResult<SimulationReport> {
    config.validate()?;

    info!(bits = config.key_bits, "generating bank key pair");
    let bank = BankAuthority::issue_key_pair(RsaBlindScheme, config.key_bits)?;

    run_with_bank(&bank, config)
}

/// Run the scenario against an existing bank
pub fn run_with_bank<S: BlindSignatureScheme>(
    bank: &BankAuthority<S>,
    config: &SimulationConfig,
) -> CashResult<SimulationReport> {
    config.validate()?;

    let span = info_span!("simulation", buyer = %config.buyer, value = config.value);
    let _guard = span.enter();

    let fingerprint = bank.public_key().fingerprint();
    debug!(%fingerprint, bits = bank.public_key().bits(), "bank key ready");

    // Issuance
    let mut coin = Coin::new(bank.scheme(), &config.buyer, config.value, bank.public_key())?;
    info!(coin_id = %coin.id(), "coin created and blinded");
    debug!(message = %coin.serialize(), "canonical coin message");

    let blind_signature = bank.sign_blinded(coin.blinded_message())?;
    info!("bank signed blinded coin");

    coin.request_unblind(bank.scheme(), blind_signature)?;
    info!(state = ?coin.state(), "signature unblinded");
    if let Some(signature) = coin.signature() {
        debug!(signature = %signature.to_hex(), "coin signature");
    }

    // Spending
    let mut receipts = Vec::with_capacity(config.spends as usize);
    for spend in 0..config.spends as usize {
        let merchant = Merchant::new(format!("Merchant {}", spend + 1), bank.public_key().clone());
        debug!(merchant = %merchant.name(), "presenting coin");
        let challenge = config.challenge.challenge_for(spend);
        let receipt = merchant.accept_coin_with_challenge(bank.scheme(), &coin, challenge)?;
        info!(
            merchant = %receipt.merchant,
            challenge = %receipt.challenge.summary(),
            "coin accepted"
        );
        receipts.push(receipt);
    }

    // Detection
    let detector = DoubleSpendDetector::new();
    let double_spend = match receipts.as_slice() {
        [first, second] => {
            let outcome = detector.detect(&first.ris, &second.ris)?;
            log_outcome(&outcome);
            Some(outcome)
        }
        _ => {
            info!("coin spent once, no double-spend check possible");
            None
        }
    };

    let merchant_replay = match receipts.first() {
        Some(first) if config.check_merchant_replay => {
            info!("checking a merchant resubmitting the same spend");
            let outcome = detector.detect(&first.ris, &first.ris.clone())?;
            log_outcome(&outcome);
            Some(outcome)
        }
        _ => None,
    };

    Ok(SimulationReport {
        coin_id: coin.id().to_string(),
        buyer: config.buyer.clone(),
        value: coin.value(),
        bank_key_fingerprint: fingerprint,
        spends: receipts.iter().map(SpendSummary::from).collect(),
        double_spend,
        merchant_replay,
    })
}

fn log_outcome(outcome: &DetectionOutcome) {
    match outcome {
        DetectionOutcome::DoubleSpendDetected { identity } => {
            warn!(%identity, "double spending identified")
        }
        DetectionOutcome::MerchantReplay => warn!("merchant cheating detected (RIS match)"),
        DetectionOutcome::MalformedEvidence { index } => {
            warn!(index = *index, "merchant cheating detected (malformed RIS set)")
        }
        DetectionOutcome::Inconclusive => info!("could not identify double spender"),
    }
}
