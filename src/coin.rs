//! Coin construction and the blind → sign → unblind lifecycle.
//!
//! A coin moves through its states in one direction only:
//!
//! ```text
//! Coin::new ──> Blinded ──receive_blind_signature──> Signed ──unblind──> Unblinded
//! ```
//!
//! Only an `Unblinded` coin carries a signature a merchant will accept.

use crate::blind::{
    BankPublicKey, BlindSignature, BlindSignatureScheme, BlindedMessage, BlindingFactor, Signature,
};
use crate::crypto::make_guid;
use crate::error::{CashError, CashResult};
use crate::identity::IdentityCommitment;
use crate::types::{Side, BANK_LABEL, FIELD_DELIMITER, HASH_DELIMITER, RIS_COUNT};

/// Where a coin is in its issuance lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoinState {
    /// Message blinded, waiting for the bank
    Blinded,
    /// Bank signature over the blinded message received
    Signed,
    /// Signature unblinded; the coin can be spent
    Unblinded,
}

/// A single e-cash coin, owned by the buyer who created it
#[derive(Debug)]
pub struct Coin {
    value: u64,
    id: String,
    identity: IdentityCommitment,
    canonical_message: String,
    public_key: BankPublicKey,
    blinded_message: BlindedMessage,
    blinding_factor: Option<BlindingFactor>,
    blind_signature: Option<BlindSignature>,
    signature: Option<Signature>,
}

impl Coin {
    /// Create a coin for `buyer` and blind its canonical message for the bank
    pub fn new<S: BlindSignatureScheme>(
        scheme: &S,
        buyer: &str,
        value: u64,
        public_key: &BankPublicKey,
    ) -> CashResult<Self> {
        if value == 0 {
            return Err(CashError::InvalidValue);
        }

        let id = make_guid();
        let identity = IdentityCommitment::build(buyer, RIS_COUNT)?;
        let canonical_message = canonical_message(
            value,
            &id,
            identity.left_hashes(),
            identity.right_hashes(),
        );

        let (blinded_message, blinding_factor) =
            scheme.blind(canonical_message.as_bytes(), public_key)?;

        Ok(Self {
            value,
            id,
            identity,
            canonical_message,
            public_key: public_key.clone(),
            blinded_message,
            blinding_factor: Some(blinding_factor),
            blind_signature: None,
            signature: None,
        })
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> CoinState {
        if self.signature.is_some() {
            CoinState::Unblinded
        } else if self.blind_signature.is_some() {
            CoinState::Signed
        } else {
            CoinState::Blinded
        }
    }

    /// What the buyer sends to the bank for signing
    pub fn blinded_message(&self) -> &BlindedMessage {
        &self.blinded_message
    }

    /// Unblinded signature, present once the coin is spendable
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn left_hashes(&self) -> &[String] {
        self.identity.left_hashes()
    }

    pub fn right_hashes(&self) -> &[String] {
        self.identity.right_hashes()
    }

    /// Store the bank's signature over the blinded message
    pub fn receive_blind_signature(&mut self, blind_signature: BlindSignature) -> CashResult<()> {
        if self.blind_signature.is_some() {
            return Err(CashError::AlreadySigned);
        }
        self.blind_signature = Some(blind_signature);
        Ok(())
    }

    /// Turn the stored blind signature into one valid over the canonical message.
    ///
    /// Consumes the blinding factor.
    pub fn unblind<S: BlindSignatureScheme>(&mut self, scheme: &S) -> CashResult<()> {
        let blind_signature = self.blind_signature.as_ref().ok_or(CashError::NotYetSigned)?;
        let factor = self
            .blinding_factor
            .as_ref()
            .ok_or(CashError::AlreadyUnblinded)?;

        let signature = scheme.unblind(blind_signature, &self.public_key, factor)?;
        self.signature = Some(signature);
        self.blinding_factor = None;
        Ok(())
    }

    /// Store the bank's blind signature and unblind it in one step
    pub fn request_unblind<S: BlindSignatureScheme>(
        &mut self,
        scheme: &S,
        blind_signature: BlindSignature,
    ) -> CashResult<()> {
        self.receive_blind_signature(blind_signature)?;
        self.unblind(scheme)
    }

    /// Hand over one half of the identity share at `index`
    pub fn reveal_share(&self, side: Side, index: usize) -> CashResult<&[u8]> {
        if index >= RIS_COUNT {
            return Err(CashError::IndexOutOfRange {
                index,
                count: RIS_COUNT,
            });
        }
        self.identity.share(side, index)
    }

    /// The exact message the signature verifies against
    pub fn serialize(&self) -> &str {
        &self.canonical_message
    }
}

fn canonical_message(value: u64, id: &str, left: &[String], right: &[String]) -> String {
    let value = value.to_string();
    let left = left.join(HASH_DELIMITER);
    let right = right.join(HASH_DELIMITER);
    [BANK_LABEL, value.as_str(), id, left.as_str(), right.as_str()].join(FIELD_DELIMITER)
}

/// Fields recovered from a canonical coin message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinFields {
    pub value: u64,
    pub id: String,
    pub left_hashes: Vec<String>,
    pub right_hashes: Vec<String>,
}

impl CoinFields {
    pub fn parse(message: &str) -> CashResult<Self> {
        let fields: Vec<&str> = message.split(FIELD_DELIMITER).collect();
        let [label, value, id, left, right] = fields.as_slice() else {
            return Err(CashError::MalformedCoin(format!(
                "expected 5 fields, got {}",
                fields.len()
            )));
        };

        if *label != BANK_LABEL {
            return Err(CashError::MalformedCoin(format!(
                "expected {}, got {}",
                BANK_LABEL, label
            )));
        }

        let value: u64 = value
            .parse()
            .map_err(|_| CashError::MalformedCoin(format!("invalid value {:?}", value)))?;
        if value == 0 {
            return Err(CashError::MalformedCoin("value must be positive".to_string()));
        }

        if id.is_empty() {
            return Err(CashError::MalformedCoin("missing coin id".to_string()));
        }

        Ok(Self {
            value,
            id: id.to_string(),
            left_hashes: parse_hash_list(left, "left")?,
            right_hashes: parse_hash_list(right, "right")?,
        })
    }

    pub fn hash_for(&self, side: Side, index: usize) -> Option<&str> {
        let hashes = match side {
            Side::Left => &self.left_hashes,
            Side::Right => &self.right_hashes,
        };
        hashes.get(index).map(String::as_str)
    }
}

fn parse_hash_list(list: &str, which: &str) -> CashResult<Vec<String>> {
    let hashes: Vec<String> = list.split(HASH_DELIMITER).map(str::to_string).collect();
    if hashes.len() != RIS_COUNT {
        return Err(CashError::MalformedCoin(format!(
            "expected {} {} hashes, got {}",
            RIS_COUNT,
            which,
            hashes.len()
        )));
    }
    if let Some(bad) = hashes
        .iter()
        .find(|h| h.len() != 64 || !h.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(CashError::MalformedCoin(format!(
            "invalid {} hash {:?}",
            which, bad
        )));
    }
    Ok(hashes)
}
