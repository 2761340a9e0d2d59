//! Blind signature scheme used by the bank.
//!
//! The coin protocol only talks to [`BlindSignatureScheme`]. [`RsaBlindScheme`]
//! is the bundled implementation: textbook RSA blinding over a SHA-256
//! full-domain hash of the message.
//!
//! ```text
//! buyer:  m' = H(m) * r^e mod n          (blind)
//! bank:   s' = m'^d mod n                (sign)
//! buyer:  s  = s' * r^-1 mod n           (unblind)
//! anyone: s^e mod n == H(m) mod n        (verify)
//! ```

use std::fmt;

use num_bigint::{BigUint, RandBigInt};
use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;
use serde::Serialize;

use crate::crypto::{hash, hash_hex};
use crate::error::{CashError, CashResult};

/// Smallest modulus accepted for bank keys
pub const MIN_KEY_BITS: usize = 512;

/// Bank public key (n, e)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BankPublicKey {
    modulus: BigUint,
    exponent: BigUint,
}

impl BankPublicKey {
    pub fn new(modulus: BigUint, exponent: BigUint) -> CashResult<Self> {
        if modulus <= BigUint::from(1u32) {
            return Err(CashError::Crypto("modulus must be greater than one".to_string()));
        }
        Ok(Self { modulus, exponent })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Short hex fingerprint of the modulus, for logs
    pub fn fingerprint(&self) -> String {
        hash_hex(&self.modulus.to_bytes_be())[..16].to_string()
    }
}

/// Bank private exponent. Never leaves the bank.
#[derive(Clone)]
pub struct BankPrivateKey {
    modulus: BigUint,
    exponent: BigUint,
}

impl BankPrivateKey {
    pub fn new(modulus: BigUint, exponent: BigUint) -> Self {
        Self { modulus, exponent }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }
}

impl fmt::Debug for BankPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankPrivateKey").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct BankKeyPair {
    pub public: BankPublicKey,
    pub(crate) private: BankPrivateKey,
}

impl BankKeyPair {
    pub fn new(public: BankPublicKey, private: BankPrivateKey) -> Self {
        Self { public, private }
    }

    pub fn private(&self) -> &BankPrivateKey {
        &self.private
    }
}

/// Coin message after blinding, the only form the bank ever sees
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlindedMessage(pub BigUint);

/// Bank signature over a blinded message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlindSignature(pub BigUint);

/// Unblinded signature, valid over the coin's canonical message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Signature(pub BigUint);

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes_be())
    }
}

/// Secret blinding scalar r. Held by the coin owner between blind and unblind.
pub struct BlindingFactor(BigUint);

impl BlindingFactor {
    pub fn new(r: BigUint) -> Self {
        Self(r)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(<redacted>)")
    }
}

/// The blind signature capability the protocol depends on
pub trait BlindSignatureScheme {
    fn generate_key_pair(&self, bits: usize) -> CashResult<BankKeyPair>;

    fn blind(
        &self,
        message: &[u8],
        public: &BankPublicKey,
    ) -> CashResult<(BlindedMessage, BlindingFactor)>;

    fn sign(&self, blinded: &BlindedMessage, key_pair: &BankKeyPair) -> CashResult<BlindSignature>;

    fn unblind(
        &self,
        blind_signature: &BlindSignature,
        public: &BankPublicKey,
        factor: &BlindingFactor,
    ) -> CashResult<Signature>;

    fn verify(&self, message: &[u8], signature: &Signature, public: &BankPublicKey) -> bool;
}

/// RSA blind signatures with a SHA-256 message representative
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaBlindScheme;

impl RsaBlindScheme {
    fn representative(message: &[u8], modulus: &BigUint) -> BigUint {
        BigUint::from_bytes_be(&hash(message)) % modulus
    }
}

fn to_biguint(value: &rsa::BigUint) -> BigUint {
    BigUint::from_bytes_be(&value.to_bytes_be())
}

impl BlindSignatureScheme for RsaBlindScheme {
    fn generate_key_pair(&self, bits: usize) -> CashResult<BankKeyPair> {
        if bits < MIN_KEY_BITS {
            return Err(CashError::KeyTooSmall {
                bits,
                minimum: MIN_KEY_BITS,
            });
        }

        let key = RsaPrivateKey::new(&mut OsRng, bits)?;
        let modulus = to_biguint(key.n());
        let public = BankPublicKey::new(modulus.clone(), to_biguint(key.e()))?;
        let private = BankPrivateKey::new(modulus, to_biguint(key.d()));

        Ok(BankKeyPair::new(public, private))
    }

    fn blind(
        &self,
        message: &[u8],
        public: &BankPublicKey,
    ) -> CashResult<(BlindedMessage, BlindingFactor)> {
        let n = public.modulus();
        let one = BigUint::from(1u32);
        let mut rng = OsRng;

        // r must be invertible mod n or the signature can't be unblinded
        let r = loop {
            let candidate = rng.gen_biguint_below(n);
            if candidate > one && candidate.modinv(n).is_some() {
                break candidate;
            }
        };

        let m = Self::representative(message, n);
        let blinded = (m * r.modpow(public.exponent(), n)) % n;

        Ok((BlindedMessage(blinded), BlindingFactor::new(r)))
    }

    fn sign(&self, blinded: &BlindedMessage, key_pair: &BankKeyPair) -> CashResult<BlindSignature> {
        let private = key_pair.private();
        if &blinded.0 >= private.modulus() {
            return Err(CashError::Crypto(
                "blinded message exceeds the bank modulus".to_string(),
            ));
        }
        Ok(BlindSignature(
            blinded.0.modpow(private.exponent(), private.modulus()),
        ))
    }

    fn unblind(
        &self,
        blind_signature: &BlindSignature,
        public: &BankPublicKey,
        factor: &BlindingFactor,
    ) -> CashResult<Signature> {
        let n = public.modulus();
        let r_inv = factor
            .value()
            .modinv(n)
            .ok_or_else(|| CashError::Crypto("blinding factor is not invertible".to_string()))?;

        Ok(Signature((&blind_signature.0 * r_inv) % n))
    }

    fn verify(&self, message: &[u8], signature: &Signature, public: &BankPublicKey) -> bool {
        let n = public.modulus();
        if &signature.0 >= n {
            return false;
        }
        signature.0.modpow(public.exponent(), n) == Self::representative(message, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_key_pair;

    #[test]
    fn test_blind_sign_unblind_verifies() {
        let scheme = RsaBlindScheme;
        let keys = test_key_pair();
        let message = b"ELECTRONIC_PIGGYBANK-20-abc";

        let (blinded, factor) = scheme.blind(message, &keys.public).unwrap();
        let blind_sig = scheme.sign(&blinded, keys).unwrap();
        let signature = scheme.unblind(&blind_sig, &keys.public, &factor).unwrap();

        assert!(scheme.verify(message, &signature, &keys.public));
        assert!(!scheme.verify(b"ELECTRONIC_PIGGYBANK-21-abc", &signature, &keys.public));
    }

    #[test]
    fn test_blinded_message_hides_representative() {
        let scheme = RsaBlindScheme;
        let keys = test_key_pair();
        let message = b"same message";

        let (first, _) = scheme.blind(message, &keys.public).unwrap();
        let (second, _) = scheme.blind(message, &keys.public).unwrap();

        // Fresh r each time
        assert_ne!(first, second);
        assert_ne!(
            first.0,
            RsaBlindScheme::representative(message, keys.public.modulus())
        );
    }

    #[test]
    fn test_blind_signature_is_not_a_valid_signature() {
        let scheme = RsaBlindScheme;
        let keys = test_key_pair();
        let message = b"coin";

        let (blinded, _) = scheme.blind(message, &keys.public).unwrap();
        let blind_sig = scheme.sign(&blinded, keys).unwrap();

        assert!(!scheme.verify(message, &Signature(blind_sig.0), &keys.public));
    }

    #[test]
    fn test_rejects_small_keys() {
        let err = RsaBlindScheme.generate_key_pair(256).unwrap_err();
        assert!(matches!(err, CashError::KeyTooSmall { bits: 256, minimum: 512 }));
    }

    #[test]
    fn test_rejects_degenerate_modulus() {
        assert!(BankPublicKey::new(BigUint::from(1u32), BigUint::from(3u32)).is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let keys = test_key_pair();
        let rendered = format!("{:?}", keys.private());
        assert!(!rendered.contains(&keys.private().exponent().to_string()));
        let factor = BlindingFactor::new(BigUint::from(12345u32));
        assert_eq!(format!("{:?}", factor), "BlindingFactor(<redacted>)");
    }
}
