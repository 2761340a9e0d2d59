//! Shared fixtures for unit tests. Key generation is slow, so one bank serves all tests.

use std::sync::OnceLock;

use crate::bank::BankAuthority;
use crate::blind::{BankKeyPair, BlindSignatureScheme, RsaBlindScheme};
use crate::coin::Coin;

const TEST_KEY_BITS: usize = 1024;

pub(crate) fn test_key_pair() -> &'static BankKeyPair {
    static KEY_PAIR: OnceLock<BankKeyPair> = OnceLock::new();
    KEY_PAIR.get_or_init(|| {
        RsaBlindScheme
            .generate_key_pair(TEST_KEY_BITS)
            .expect("test key generation")
    })
}

pub(crate) fn test_bank() -> &'static BankAuthority {
    static BANK: OnceLock<BankAuthority> = OnceLock::new();
    BANK.get_or_init(|| BankAuthority::with_key_pair(RsaBlindScheme, test_key_pair().clone()))
}

/// A coin taken through blind, sign and unblind by the test bank
pub(crate) fn signed_coin(buyer: &str, value: u64) -> Coin {
    let bank = test_bank();
    let mut coin = Coin::new(bank.scheme(), buyer, value, bank.public_key()).expect("coin");
    let blind_sig = bank.sign_blinded(coin.blinded_message()).expect("bank signature");
    coin.request_unblind(bank.scheme(), blind_sig).expect("unblind");
    coin
}
