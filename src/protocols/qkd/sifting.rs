//! Basis reconciliation (sifting) and key extraction.

use super::basis::Basis;
use crate::errors::QkdError;
use tracing::debug;

/// Outcome of comparing sender and receiver data round by round.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// `Some(basis)` where both parties used the same basis.
    pub matched_bases: Vec<Option<Basis>>,
    /// `Some(bits agree)` exactly where `matched_bases` is `Some`.
    pub matched_bits: Vec<Option<bool>>,
    pub agree_count: usize,
    pub disagree_count: usize,
    /// Total rounds compared, `n`.
    pub rounds: usize,
}

impl Reconciliation {
    /// Number of rounds with matching bases.
    pub fn total_compared(&self) -> usize {
        self.agree_count + self.disagree_count
    }

    /// `agree_count / n`.
    ///
    /// The denominator is every round, not only the matched ones, so a clean
    /// run sits near 0.5 rather than 1.0. The detection band relies on this.
    pub fn agreement_rate(&self) -> f64 {
        self.agree_count as f64 / self.rounds as f64
    }

    /// Indices where bases matched, in order.
    pub fn matched_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.matched_bases
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|_| i))
    }
}

fn check_bases(sender_basis: &[Basis], receiver_basis: &[Basis]) -> Result<usize, QkdError> {
    let n = sender_basis.len();
    QkdError::check_len(n, receiver_basis.len())?;
    if n == 0 {
        return Err(QkdError::InvalidLength {
            len: 0,
            reason: "nothing to reconcile",
        });
    }
    Ok(n)
}

/// Compares bases, then bits on the matched rounds.
pub fn reconcile(
    sender_basis: &[Basis],
    sender_bits: &[bool],
    receiver_basis: &[Basis],
    receiver_bits: &[bool],
) -> Result<Reconciliation, QkdError> {
    let n = check_bases(sender_basis, receiver_basis)?;
    QkdError::check_len(n, sender_bits.len())?;
    QkdError::check_len(n, receiver_bits.len())?;

    let mut matched_bases = vec![None; n];
    let mut matched_bits = vec![None; n];
    let mut agree_count = 0;
    let mut disagree_count = 0;

    for i in 0..n {
        if sender_basis[i] != receiver_basis[i] {
            continue;
        }
        matched_bases[i] = Some(sender_basis[i]);

        let agree = sender_bits[i] == receiver_bits[i];
        matched_bits[i] = Some(agree);
        if agree {
            agree_count += 1;
        } else {
            disagree_count += 1;
        }
    }

    debug!(
        rounds = n,
        matched = agree_count + disagree_count,
        agree = agree_count,
        "reconciled bases"
    );

    Ok(Reconciliation {
        matched_bases,
        matched_bits,
        agree_count,
        disagree_count,
        rounds: n,
    })
}

/// Keeps `bits[i]` wherever the two bases match.
///
/// Called with the receiver's bits this is the shared key; called with the
/// sender's bits it gives the copy used to check that both ends agree.
pub fn extract_key(
    sender_basis: &[Basis],
    receiver_basis: &[Basis],
    bits: &[bool],
) -> Result<Vec<bool>, QkdError> {
    let n = check_bases(sender_basis, receiver_basis)?;
    QkdError::check_len(n, bits.len())?;

    Ok(sender_basis
        .iter()
        .zip(receiver_basis)
        .zip(bits)
        .filter(|((s, r), _)| s == r)
        .map(|(_, &bit)| bit)
        .collect())
}
