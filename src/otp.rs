//! One-time pad over byte strings.

use crate::crypto::random_bytes;
use crate::error::{CashError, CashResult};

/// Key and ciphertext produced by a single [`OneTimePad::encode`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PadPair {
    pub key: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// XOR one-time pad. Every `encode` draws a fresh key.
pub struct OneTimePad;

impl OneTimePad {
    pub fn encode(plaintext: &[u8]) -> PadPair {
        let key = random_bytes(plaintext.len());
        let ciphertext = xor(plaintext, &key);
        PadPair { key, ciphertext }
    }

    pub fn decode(key: &[u8], ciphertext: &[u8]) -> CashResult<Vec<u8>> {
        if key.len() != ciphertext.len() {
            return Err(CashError::LengthMismatch {
                key: key.len(),
                ciphertext: ciphertext.len(),
            });
        }
        Ok(xor(key, ciphertext))
    }

    /// Decode and read the result as UTF-8. `None` on length mismatch or invalid UTF-8.
    pub fn decode_to_string(key: &[u8], ciphertext: &[u8]) -> Option<String> {
        let bytes = Self::decode(key, ciphertext).ok()?;
        String::from_utf8(bytes).ok()
    }
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}
