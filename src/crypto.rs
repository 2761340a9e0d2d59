//! Random source and hash primitives.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

use crate::types::Bytes32;

/// Length of a coin id before hex encoding
pub const COIN_ID_BYTES: usize = 48;

/// `n` bytes from the OS CSPRNG
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Unbiased coin flip
pub fn random_bit() -> bool {
    OsRng.gen::<bool>()
}

/// Fresh high-entropy coin id, hex-encoded
pub fn make_guid() -> String {
    hex::encode(random_bytes(COIN_ID_BYTES))
}

/// SHA-256 digest
pub fn hash(bytes: &[u8]) -> Bytes32 {
    let result = Sha256::digest(bytes);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// SHA-256 digest as lowercase hex, the form committed into coin messages
pub fn hash_hex(bytes: &[u8]) -> String {
    hex::encode(hash(bytes))
}
