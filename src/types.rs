//! Chaumian Coin - Types and Protocol Constants
//!
//! This module defines the values that move between buyer, bank and merchant:
//! - Side / Challenge: which half of each identity share a merchant asks for
//! - RevealedShare / RisSet: what a buyer hands over on one spend
//! - Protocol constants shared by the coin format and the detector

use serde::{Deserialize, Serialize};

/// 32-byte digest
pub type Bytes32 = [u8; 32];

/// Number of identity share pairs embedded in each coin
pub const RIS_COUNT: usize = 20;

/// Prefix of the plaintext hidden in every share pair
pub const IDENT_PREFIX: &str = "IDENT";

/// Separator between the identity prefix and the buyer name
pub const IDENT_DELIMITER: &str = ":";

/// Label that opens every canonical coin message
pub const BANK_LABEL: &str = "ELECTRONIC_PIGGYBANK";

/// Separator between canonical message fields
pub const FIELD_DELIMITER: &str = "-";

/// Separator inside the hash lists of a canonical message
pub const HASH_DELIMITER: &str = ",";

/// The plaintext a buyer's shares decode to
pub fn identity_plaintext(buyer: &str) -> String {
    format!("{}{}{}", IDENT_PREFIX, IDENT_DELIMITER, buyer)
}

/// Half of an identity share pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// OTP key
    Left,
    /// OTP ciphertext
    Right,
}

impl Side {
    pub fn from_bit(use_left: bool) -> Self {
        if use_left {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn is_left(self) -> bool {
        self == Side::Left
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Merchant challenge: the side requested at each RIS index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge(Vec<Side>);

impl Challenge {
    /// Same side at every index
    pub fn uniform(side: Side) -> Self {
        Self(vec![side; RIS_COUNT])
    }

    pub fn from_sides(sides: Vec<Side>) -> Self {
        Self(sides)
    }

    /// One unbiased bit for the whole challenge
    pub fn random_uniform() -> Self {
        Self::uniform(Side::from_bit(crate::crypto::random_bit()))
    }

    /// An independent unbiased bit per index
    pub fn random_per_index() -> Self {
        Self(
            (0..RIS_COUNT)
                .map(|_| Side::from_bit(crate::crypto::random_bit()))
                .collect(),
        )
    }

    pub fn sides(&self) -> &[Side] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact `L`/`R` rendering for logs and reports
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|side| if side.is_left() { 'L' } else { 'R' })
            .collect()
    }
}

/// One share revealed on a spend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedShare {
    pub index: usize,
    pub side: Side,
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

/// Revealed Identity Shares collected by one merchant for one coin
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RisSet {
    pub coin_id: String,
    pub shares: Vec<RevealedShare>,
}

impl RisSet {
    pub fn new(coin_id: String, shares: Vec<RevealedShare>) -> Self {
        Self { coin_id, shares }
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Share revealed at `index`, if any
    pub fn share_at(&self, index: usize) -> Option<&RevealedShare> {
        self.shares.iter().find(|share| share.index == index)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
