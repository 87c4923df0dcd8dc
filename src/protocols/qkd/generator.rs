//! Random bases and sender bits for one protocol run.

use super::basis::Basis;
use crate::errors::QkdError;
use rand::Rng;
use tracing::debug;

/// Bases chosen by an intercept-resend eavesdropper.
#[derive(Debug, Clone, PartialEq)]
pub struct EavesdropperBases {
    /// Basis used to measure the sender's photon.
    pub incident: Vec<Basis>,
    /// Basis used to re-prepare the photon sent on to the receiver.
    pub transmitted: Vec<Basis>,
}

/// Everything drawn at random before any photon is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSetup {
    pub sender_bits: Vec<bool>,
    pub sender_basis: Vec<Basis>,
    pub receiver_basis: Vec<Basis>,
    pub eve: Option<EavesdropperBases>,
}

impl RoundSetup {
    /// Number of photons in the run.
    pub fn rounds(&self) -> usize {
        self.sender_bits.len()
    }
}

fn random_bases<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Basis> {
    (0..n).map(|_| rng.random()).collect()
}

fn check_rounds(n: usize) -> Result<(), QkdError> {
    if n == 0 {
        return Err(QkdError::InvalidLength {
            len: n,
            reason: "protocol needs at least one round",
        });
    }
    Ok(())
}

/// Draws sender bits, sender bases and receiver bases for `n` rounds.
pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<RoundSetup, QkdError> {
    check_rounds(n)?;

    let sender_bits = (0..n).map(|_| rng.random_bool(0.5)).collect();
    let sender_basis = random_bases(n, rng);
    let receiver_basis = random_bases(n, rng);

    debug!(rounds = n, "generated sender bits and bases");

    Ok(RoundSetup {
        sender_bits,
        sender_basis,
        receiver_basis,
        eve: None,
    })
}

/// Like [`generate`], plus independent incident and transmitted bases for Eve.
pub fn generate_with_eve<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<RoundSetup, QkdError> {
    let mut setup = generate(n, rng)?;
    let incident = random_bases(n, rng);
    let transmitted = random_bases(n, rng);

    debug!(rounds = n, "generated eavesdropper bases");

    setup.eve = Some(EavesdropperBases {
        incident,
        transmitted,
    });
    Ok(setup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_rounds_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate(0, &mut rng),
            Err(QkdError::InvalidLength { len: 0, .. })
        ));
        assert!(generate_with_eve(0, &mut rng).is_err());
    }

    #[test]
    fn sequences_have_requested_length() {
        let mut rng = StdRng::seed_from_u64(5);
        let setup = generate_with_eve(37, &mut rng).unwrap();
        assert_eq!(setup.rounds(), 37);
        assert_eq!(setup.sender_basis.len(), 37);
        assert_eq!(setup.receiver_basis.len(), 37);
        let eve = setup.eve.unwrap();
        assert_eq!(eve.incident.len(), 37);
        assert_eq!(eve.transmitted.len(), 37);
    }

    #[test]
    fn draws_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let setup = generate(4000, &mut rng).unwrap();
        let ones = setup.sender_bits.iter().filter(|&&b| b).count();
        let diagonal = setup
            .sender_basis
            .iter()
            .filter(|&&b| b == Basis::Diagonal)
            .count();
        assert!((1800..2200).contains(&ones));
        assert!((1800..2200).contains(&diagonal));
    }

    #[test]
    fn same_seed_same_setup() {
        let a = generate(20, &mut StdRng::seed_from_u64(8)).unwrap();
        let b = generate(20, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
    }
}
