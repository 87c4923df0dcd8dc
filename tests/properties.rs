//! Property tests for the channel, sifting, codec and cipher.

use bb84_qkd::message::{decode, encode, xor_decrypt, xor_encrypt};
use bb84_qkd::protocols::qkd::{Basis, extract_key, reconcile, simulate_without_eve};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn basis() -> impl Strategy<Value = Basis> {
    prop_oneof![Just(Basis::Rectilinear), Just(Basis::Diagonal)]
}

/// Equal-length sender bases, sender bits and receiver bases.
fn round_data() -> impl Strategy<Value = (Vec<Basis>, Vec<bool>, Vec<Basis>)> {
    (1usize..64).prop_flat_map(|n| {
        (
            prop::collection::vec(basis(), n),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(basis(), n),
        )
    })
}

proptest! {
    #[test]
    fn matched_bases_are_deterministic((sb, bits, rb) in round_data(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let received = simulate_without_eve(&sb, &bits, &rb, &mut rng).unwrap();
        prop_assert_eq!(received.len(), bits.len());
        for i in 0..bits.len() {
            if sb[i] == rb[i] {
                prop_assert_eq!(received[i], bits[i]);
            }
        }
    }

    #[test]
    fn reconciliation_invariants((sb, bits, rb) in round_data(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let received = simulate_without_eve(&sb, &bits, &rb, &mut rng).unwrap();
        let rec = reconcile(&sb, &bits, &rb, &received).unwrap();

        prop_assert_eq!(rec.total_compared(), rec.agree_count + rec.disagree_count);
        prop_assert!(rec.total_compared() <= rec.rounds);
        for (b, m) in rec.matched_bases.iter().zip(&rec.matched_bits) {
            prop_assert_eq!(b.is_some(), m.is_some());
        }

        let key = extract_key(&sb, &rb, &received).unwrap();
        let sender_key = extract_key(&sb, &rb, &bits).unwrap();
        prop_assert_eq!(key.len(), rec.total_compared());
        prop_assert_eq!(key, sender_key);
        prop_assert_eq!(rec.disagree_count, 0);
    }

    #[test]
    fn codec_round_trip(text in "[@-_]{0,40}") {
        let bits = encode(&text).unwrap();
        prop_assert_eq!(bits.len(), text.len() * 5);
        prop_assert_eq!(decode(&bits).unwrap(), text);
    }

    #[test]
    fn cipher_round_trip(
        data in prop::collection::vec(any::<bool>(), 0..64),
        extra in prop::collection::vec(any::<bool>(), 0..16),
        seed in prop::collection::vec(any::<bool>(), 64),
    ) {
        let mut key = seed[..data.len()].to_vec();
        key.extend(extra);
        let encrypted = xor_encrypt(&data, &key).unwrap();
        prop_assert_eq!(xor_decrypt(&encrypted, &key).unwrap(), data);
    }

    #[test]
    fn short_key_always_rejected(
        data in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let key = &data[..data.len() - 1];
        prop_assert!(xor_encrypt(&data, key).is_err());
    }
}
