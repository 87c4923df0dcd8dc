//! Eavesdropper detection from the public comparison of bases and bits.
//!
//! Without an eavesdropper half of the bases match and every matched bit
//! agrees, so `agree / n` sits near 0.5. With an intercept-resend attack only
//! about 5/8 of the matched bits still agree, bringing the rate down to about
//! 5/16. Anything inside the acceptance band is treated as tampered.

use super::basis::Basis;
use super::sifting::{Reconciliation, reconcile};
use crate::config::AcceptanceBand;
use crate::errors::QkdError;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    LikelyEavesdropped,
}

/// Detection outcome plus the numbers it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub verdict: Verdict,
    /// `agree_count / rounds`
    pub agreement_rate: f64,
    pub rounds: usize,
    pub total_compared: usize,
    pub agree_count: usize,
    pub disagree_count: usize,
}

impl DetectionReport {
    fn from_reconciliation(rec: &Reconciliation, band: &AcceptanceBand) -> Self {
        let agreement_rate = rec.agreement_rate();
        let verdict = if band.contains(agreement_rate) {
            Verdict::LikelyEavesdropped
        } else {
            Verdict::Safe
        };

        Self {
            verdict,
            agreement_rate,
            rounds: rec.rounds,
            total_compared: rec.total_compared(),
            agree_count: rec.agree_count,
            disagree_count: rec.disagree_count,
        }
    }

    pub fn is_safe(&self) -> bool {
        self.verdict == Verdict::Safe
    }
}

/// Classifies agreement rates against a fixed band.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    pub band: AcceptanceBand,
}

impl Detector {
    pub fn new(band: AcceptanceBand) -> Self {
        Self { band }
    }

    pub fn detect(
        &self,
        sender_basis: &[Basis],
        receiver_basis: &[Basis],
        sender_bits: &[bool],
        receiver_bits: &[bool],
    ) -> Result<DetectionReport, QkdError> {
        let rec = reconcile(sender_basis, sender_bits, receiver_basis, receiver_bits)?;
        Ok(self.classify(&rec))
    }

    /// Classifies an existing reconciliation without recomputing it.
    pub fn classify(&self, rec: &Reconciliation) -> DetectionReport {
        let report = DetectionReport::from_reconciliation(rec, &self.band);

        match report.verdict {
            Verdict::Safe => info!(
                rate = report.agreement_rate,
                compared = report.total_compared,
                "key is safe"
            ),
            Verdict::LikelyEavesdropped => warn!(
                rate = report.agreement_rate,
                compared = report.total_compared,
                "agreement rate inside eavesdropping band, discard key"
            ),
        }

        report
    }
}

/// [`Detector::detect`] with the default `[0.15, 0.40]` band.
pub fn detect(
    sender_basis: &[Basis],
    receiver_basis: &[Basis],
    sender_bits: &[bool],
    receiver_bits: &[bool],
) -> Result<DetectionReport, QkdError> {
    Detector::default().detect(sender_basis, receiver_basis, sender_bits, receiver_bits)
}
