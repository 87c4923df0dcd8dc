use crate::errors::QkdError;
use crate::protocols::qkd::{Bb84, Verdict};
use crate::report::NoopReporter;
use rand::Rng;
use tracing::debug;

/// Agreement-rate statistics over repeated protocol runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub trials: usize,
    pub mean_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    /// Runs classified as likely eavesdropped.
    pub flagged: usize,
}

impl SampleSummary {
    /// Fraction of runs that were flagged.
    pub fn flagged_ratio(&self) -> f64 {
        self.flagged as f64 / self.trials as f64
    }
}

/// A driver for repeating BB84 runs.
///
/// The `Sampler` runs many independent rounds of the protocol with the same
/// link and detector and collects the detection statistics of each.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    pub protocol: Bb84,
}

impl Sampler {
    /// Creates a new `Sampler` over the given protocol driver.
    pub fn new(protocol: Bb84) -> Self {
        Self { protocol }
    }

    /// Runs `trials` independent protocol runs of `rounds` photons each.
    ///
    /// # Arguments
    ///
    /// * `rounds` - Photons per run.
    /// * `trials` - Number of runs.
    /// * `eavesdropper` - Whether every run is intercepted.
    /// * `rng` - Entropy source shared by all runs.
    pub fn run<R: Rng + ?Sized>(
        &self,
        rounds: usize,
        trials: usize,
        eavesdropper: bool,
        rng: &mut R,
    ) -> Result<SampleSummary, QkdError> {
        if trials == 0 {
            return Err(QkdError::InvalidLength {
                len: 0,
                reason: "sampling needs at least one trial",
            });
        }

        let mut sum = 0.0;
        let mut min_rate = f64::INFINITY;
        let mut max_rate = f64::NEG_INFINITY;
        let mut flagged = 0;

        for _ in 0..trials {
            let outcome = self
                .protocol
                .run(rounds, eavesdropper, rng, &mut NoopReporter)?;
            let rate = outcome.detection.agreement_rate;

            sum += rate;
            min_rate = min_rate.min(rate);
            max_rate = max_rate.max(rate);
            if outcome.detection.verdict == Verdict::LikelyEavesdropped {
                flagged += 1;
            }
        }

        let summary = SampleSummary {
            trials,
            mean_rate: sum / trials as f64,
            min_rate,
            max_rate,
            flagged,
        };
        debug!(?summary, "sampling finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_trials_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Sampler::default().run(10, 0, false, &mut rng).is_err());
    }

    #[test]
    fn single_trial_bounds_collapse() {
        let mut rng = StdRng::seed_from_u64(30);
        let summary = Sampler::default().run(50, 1, false, &mut rng).unwrap();
        assert_eq!(summary.trials, 1);
        assert_eq!(summary.min_rate, summary.max_rate);
        assert_eq!(summary.mean_rate, summary.min_rate);
    }

    #[test]
    fn eavesdropped_runs_are_flagged() {
        let mut rng = StdRng::seed_from_u64(31);
        let summary = Sampler::default().run(500, 10, true, &mut rng).unwrap();
        assert_eq!(summary.flagged, 10);
        assert!((summary.mean_rate - 0.3125).abs() < 0.05);
    }

    #[test]
    fn clean_runs_pass() {
        let mut rng = StdRng::seed_from_u64(32);
        let summary = Sampler::default().run(500, 10, false, &mut rng).unwrap();
        assert_eq!(summary.flagged, 0);
        assert_eq!(summary.flagged_ratio(), 0.0);
        assert!((summary.mean_rate - 0.5).abs() < 0.05);
    }
}
