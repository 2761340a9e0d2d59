//! Double-spend detection over two RIS sets of the same coin.
//!
//! When the two spends asked for different sides at some index, XOR of the
//! two revealed shares at that index is the buyer's `IDENT:<buyer>` plaintext.
//! Indices where both spends asked for the same side carry no information and
//! are skipped.
//!
//! Each set must reveal exactly one side at every index. A set that shows both
//! halves somewhere, or leaves an index out, did not come from an honest spend
//! and is reported as [`DetectionOutcome::MalformedEvidence`] before anything
//! is decoded.

use serde::{Deserialize, Serialize};

use crate::error::{CashError, CashResult};
use crate::otp::OneTimePad;
use crate::types::{RevealedShare, RisSet, Side, IDENT_DELIMITER, IDENT_PREFIX, RIS_COUNT};

/// Result of comparing two spends of one coin
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetectionOutcome {
    /// Identical RIS sets: a merchant submitted the same spend twice
    MerchantReplay,
    /// The buyer spent the coin twice and is identified
    DoubleSpendDetected { identity: String },
    /// A set reveals no share, or more than one, at `index`
    MalformedEvidence { index: usize },
    /// No index yielded the identity
    Inconclusive,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleSpendDetector;

impl DoubleSpendDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, first: &RisSet, second: &RisSet) -> CashResult<DetectionOutcome> {
        if first.coin_id != second.coin_id {
            return Err(CashError::CoinMismatch {
                first: first.coin_id.clone(),
                second: second.coin_id.clone(),
            });
        }

        for set in [first, second] {
            if let Err(index) = check_evidence(set) {
                return Ok(DetectionOutcome::MalformedEvidence { index });
            }
        }

        if first.shares == second.shares {
            return Ok(DetectionOutcome::MerchantReplay);
        }

        for share in &first.shares {
            let Some(other) = second.share_at(share.index) else {
                continue;
            };
            if share.side == other.side {
                continue;
            }
            if let Some(identity) = recover_identity(share, other) {
                return Ok(DetectionOutcome::DoubleSpendDetected { identity });
            }
        }

        Ok(DetectionOutcome::Inconclusive)
    }
}

/// One share per index in `0..RIS_COUNT`; the first offending index otherwise
fn check_evidence(set: &RisSet) -> Result<(), usize> {
    let mut seen = [false; RIS_COUNT];
    for share in &set.shares {
        match seen.get_mut(share.index) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(share.index),
        }
    }
    match seen.iter().position(|revealed| !revealed) {
        Some(missing) => Err(missing),
        None => Ok(()),
    }
}

fn recover_identity(a: &RevealedShare, b: &RevealedShare) -> Option<String> {
    let (left, right) = match a.side {
        Side::Left => (a, b),
        Side::Right => (b, a),
    };
    let decoded = OneTimePad::decode_to_string(&left.bytes, &right.bytes)?;
    let (prefix, identity) = decoded.split_once(IDENT_DELIMITER)?;
    (prefix == IDENT_PREFIX).then(|| identity.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blind::RsaBlindScheme;
    use crate::merchant::Merchant;
    use crate::test_support::{signed_coin, test_bank};
    use crate::types::Challenge;

    fn spend(coin: &crate::coin::Coin, challenge: Challenge) -> RisSet {
        Merchant::new("Shop", test_bank().public_key().clone())
            .accept_coin_with_challenge(&RsaBlindScheme, coin, challenge)
            .unwrap()
            .ris
    }

    #[test]
    fn test_complementary_spends_reveal_identity() {
        let coin = signed_coin("Alice", 20);
        let first = spend(&coin, Challenge::uniform(Side::Left));
        let second = spend(&coin, Challenge::uniform(Side::Right));

        let outcome = DoubleSpendDetector::new().detect(&first, &second).unwrap();
        assert_eq!(
            outcome,
            DetectionOutcome::DoubleSpendDetected {
                identity: "Alice".to_string()
            }
        );

        // Order of the two sets does not matter
        let swapped = DoubleSpendDetector::new().detect(&second, &first).unwrap();
        assert_eq!(swapped, outcome);
    }

    #[test]
    fn test_single_differing_index_is_enough() {
        let coin = signed_coin("Bob the Builder", 5);
        let mut sides = vec![Side::Left; RIS_COUNT];
        let first = spend(&coin, Challenge::from_sides(sides.clone()));
        sides[RIS_COUNT - 1] = Side::Right;
        let second = spend(&coin, Challenge::from_sides(sides));

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &second).unwrap(),
            DetectionOutcome::DoubleSpendDetected {
                identity: "Bob the Builder".to_string()
            }
        );
    }

    #[test]
    fn test_identity_containing_delimiter_survives() {
        let coin = signed_coin("Alice:Smith", 20);
        let first = spend(&coin, Challenge::uniform(Side::Right));
        let second = spend(&coin, Challenge::uniform(Side::Left));

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &second).unwrap(),
            DetectionOutcome::DoubleSpendDetected {
                identity: "Alice:Smith".to_string()
            }
        );
    }

    #[test]
    fn test_identical_sets_are_merchant_replay() {
        let coin = signed_coin("Alice", 20);
        let first = spend(&coin, Challenge::random_per_index());

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &first.clone()).unwrap(),
            DetectionOutcome::MerchantReplay
        );
    }

    #[test]
    fn test_same_challenge_from_two_merchants_is_replay() {
        // Same coin, same sides: the shares are identical, so nothing
        // distinguishes two honest spends from one replayed spend.
        let coin = signed_coin("Alice", 20);
        let first = spend(&coin, Challenge::uniform(Side::Left));
        let second = spend(&coin, Challenge::uniform(Side::Left));

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &second).unwrap(),
            DetectionOutcome::MerchantReplay
        );
    }

    #[test]
    fn test_corrupted_shares_are_inconclusive() {
        let coin = signed_coin("Alice", 20);
        let first = spend(&coin, Challenge::uniform(Side::Left));
        let mut second = spend(&coin, Challenge::uniform(Side::Right));
        for share in &mut second.shares {
            share.bytes.truncate(2);
        }

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &second).unwrap(),
            DetectionOutcome::Inconclusive
        );
    }

    #[test]
    fn test_shares_from_unrelated_coins_never_decode() {
        let coin = signed_coin("Alice", 20);
        let other = signed_coin("Alice", 20);
        let first = spend(&coin, Challenge::uniform(Side::Left));
        let mut second = spend(&other, Challenge::uniform(Side::Right));
        second.coin_id = first.coin_id.clone();

        assert_eq!(
            DoubleSpendDetector::new().detect(&first, &second).unwrap(),
            DetectionOutcome::Inconclusive
        );
    }

    #[test]
    fn test_both_halves_at_one_index_is_malformed() {
        let coin = signed_coin("Alice", 20);
        let honest = spend(&coin, Challenge::uniform(Side::Left));
        let mut doctored = honest.clone();
        doctored.shares.push(RevealedShare {
            index: 0,
            side: Side::Right,
            bytes: coin.reveal_share(Side::Right, 0).unwrap().to_vec(),
        });

        let detector = DoubleSpendDetector::new();
        let expected = DetectionOutcome::MalformedEvidence { index: 0 };
        assert_eq!(detector.detect(&doctored, &honest).unwrap(), expected);
        assert_eq!(detector.detect(&honest, &doctored).unwrap(), expected);
        assert_eq!(detector.detect(&doctored, &doctored).unwrap(), expected);
    }

    #[test]
    fn test_missing_or_out_of_range_index_is_malformed() {
        let coin = signed_coin("Alice", 20);
        let honest = spend(&coin, Challenge::uniform(Side::Left));
        let detector = DoubleSpendDetector::new();

        let mut short = spend(&coin, Challenge::uniform(Side::Right));
        short.shares.remove(7);
        assert_eq!(
            detector.detect(&honest, &short).unwrap(),
            DetectionOutcome::MalformedEvidence { index: 7 }
        );

        let mut stray = spend(&coin, Challenge::uniform(Side::Right));
        stray.shares[RIS_COUNT - 1].index = RIS_COUNT;
        assert_eq!(
            detector.detect(&stray, &honest).unwrap(),
            DetectionOutcome::MalformedEvidence { index: RIS_COUNT }
        );
    }

    #[test]
    fn test_rejects_sets_from_different_coins() {
        let first = RisSet::new("coin-a".to_string(), vec![]);
        let second = RisSet::new("coin-b".to_string(), vec![]);

        assert!(matches!(
            DoubleSpendDetector::new().detect(&first, &second),
            Err(CashError::CoinMismatch { .. })
        ));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = DetectionOutcome::DoubleSpendDetected {
            identity: "Alice".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "double_spend_detected");
        assert_eq!(json["identity"], "Alice");
    }
}
