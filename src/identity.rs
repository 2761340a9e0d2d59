//! Identity commitments embedded in every coin.
//!
//! Each share pair is an independent one-time-pad encoding of the same
//! `IDENT:<buyer>` plaintext. Left shares are pad keys, right shares are
//! ciphertexts. One half alone says nothing about the buyer; both halves of
//! the same index reveal the buyer's name.

use crate::crypto::hash_hex;
use crate::error::{CashError, CashResult};
use crate::otp::OneTimePad;
use crate::types::{identity_plaintext, Side};

/// Share pairs and their digests for one coin
#[derive(Clone, Debug)]
pub struct IdentityCommitment {
    left: Vec<Vec<u8>>,
    right: Vec<Vec<u8>>,
    left_hashes: Vec<String>,
    right_hashes: Vec<String>,
}

impl IdentityCommitment {
    /// Build `count` independent share pairs for `buyer`
    pub fn build(buyer: &str, count: usize) -> CashResult<Self> {
        if buyer.is_empty() {
            return Err(CashError::EmptyIdentity);
        }

        let plaintext = identity_plaintext(buyer);
        let mut commitment = Self {
            left: Vec::with_capacity(count),
            right: Vec::with_capacity(count),
            left_hashes: Vec::with_capacity(count),
            right_hashes: Vec::with_capacity(count),
        };

        for _ in 0..count {
            let pair = OneTimePad::encode(plaintext.as_bytes());
            commitment.left_hashes.push(hash_hex(&pair.key));
            commitment.right_hashes.push(hash_hex(&pair.ciphertext));
            commitment.left.push(pair.key);
            commitment.right.push(pair.ciphertext);
        }

        Ok(commitment)
    }

    pub fn count(&self) -> usize {
        self.left.len()
    }

    pub fn share(&self, side: Side, index: usize) -> CashResult<&[u8]> {
        let shares = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        shares
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CashError::IndexOutOfRange {
                index,
                count: shares.len(),
            })
    }

    pub fn left_hashes(&self) -> &[String] {
        &self.left_hashes
    }

    pub fn right_hashes(&self) -> &[String] {
        &self.right_hashes
    }
}
