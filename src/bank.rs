//! Bank Authority
//!
//! The bank holds the signing key for the lifetime of the simulation. It is
//! constructed explicitly and passed to whoever needs it; there is no global
//! key. Signing happens over blinded messages only, so the bank never learns
//! which coin it signed.

use crate::blind::{
    BankKeyPair, BankPublicKey, BlindSignature, BlindSignatureScheme, BlindedMessage,
    RsaBlindScheme, Signature,
};
use crate::coin::CoinFields;
use crate::error::CashResult;

/// Key size used when nothing else is configured
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Coin-issuing bank
#[derive(Debug)]
pub struct BankAuthority<S: BlindSignatureScheme = RsaBlindScheme> {
    scheme: S,
    key_pair: BankKeyPair,
}

impl<S: BlindSignatureScheme> BankAuthority<S> {
    /// Create the bank with a fresh key pair of `bits` strength
    pub fn issue_key_pair(scheme: S, bits: usize) -> CashResult<Self> {
        let key_pair = scheme.generate_key_pair(bits)?;
        Ok(Self { scheme, key_pair })
    }

    /// Create the bank around an existing key pair
    pub fn with_key_pair(scheme: S, key_pair: BankKeyPair) -> Self {
        Self { scheme, key_pair }
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn public_key(&self) -> &BankPublicKey {
        &self.key_pair.public
    }

    /// Sign a blinded coin message
    pub fn sign_blinded(&self, blinded: &BlindedMessage) -> CashResult<BlindSignature> {
        self.scheme.sign(blinded, &self.key_pair)
    }

    /// Check an unblinded signature against a canonical coin message
    pub fn verify(&self, message: &str, signature: &Signature) -> bool {
        self.scheme
            .verify(message.as_bytes(), signature, self.public_key())
    }
}

/// Parse a canonical coin message, rejecting anything not in the bank's format
pub fn verify_coin_format(message: &str) -> CashResult<CoinFields> {
    CoinFields::parse(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use crate::error::CashError;
    use crate::test_support::{test_bank, test_key_pair};

    #[test]
    fn test_bank_signs_without_seeing_message() {
        let bank = test_bank();
        let mut coin = Coin::new(bank.scheme(), "Alice", 20, bank.public_key()).unwrap();

        // The bank only ever handles the blinded form
        let blinded = coin.blinded_message().clone();
        let blind_sig = bank.sign_blinded(&blinded).unwrap();
        assert!(!bank.verify(coin.serialize(), &Signature(blind_sig.0.clone())));

        coin.request_unblind(bank.scheme(), blind_sig).unwrap();
        assert!(bank.verify(coin.serialize(), coin.signature().unwrap()));
    }

    #[test]
    fn test_with_key_pair_shares_public_key() {
        let bank = BankAuthority::with_key_pair(RsaBlindScheme, test_key_pair().clone());
        assert_eq!(bank.public_key(), &test_key_pair().public);
    }

    #[test]
    fn test_other_bank_signature_rejected() {
        let other = BankAuthority::issue_key_pair(RsaBlindScheme, 512).unwrap();
        let bank = test_bank();

        let mut coin = Coin::new(bank.scheme(), "Alice", 20, bank.public_key()).unwrap();
        let blind_sig = bank.sign_blinded(coin.blinded_message()).unwrap();
        coin.request_unblind(bank.scheme(), blind_sig).unwrap();

        assert!(!other.verify(coin.serialize(), coin.signature().unwrap()));
    }

    #[test]
    fn test_verify_coin_format() {
        let bank = test_bank();
        let coin = Coin::new(bank.scheme(), "Alice", 20, bank.public_key()).unwrap();

        let fields = verify_coin_format(coin.serialize()).unwrap();
        assert_eq!(fields.id, coin.id());

        assert!(matches!(
            verify_coin_format("PIGGYBANK-20-x-y-z"),
            Err(CashError::MalformedCoin(_))
        ));
    }
}
