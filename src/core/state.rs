use crate::core::errors::StateError;
use crate::core::utils::{sandwich, trace};
use crate::core::{Gate, Measurement, MeasurementResult, QuantumChannel};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// Outcome probabilities below this are treated as exactly zero, so that a
/// measurement in the preparation basis is deterministic.
const PROBABILITY_FLOOR: f64 = 1e-12;

/// Density matrix of a single polarization qubit.
#[derive(Clone, Debug)]
pub struct QuantumState {
    pub density_matrix: Array2<Complex64>,
}

impl Default for QuantumState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0>.
    pub fn new() -> Self {
        let mut density_matrix = Array2::<Complex64>::zeros((2, 2));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self { density_matrix }
    }

    /// Checks if a QuantumState is valid (unit trace).
    pub fn is_valid(&self) -> Result<(), StateError> {
        let tr = trace(&self.density_matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > 1e-12 {
            return Err(StateError::InvalidTrace(tr));
        }
        Ok(())
    }

    /// Applies a unitary gate: rho' = U rho U†
    pub fn apply(&mut self, gate: &Gate) {
        self.density_matrix = sandwich(&gate.matrix, &self.density_matrix);
    }

    /// Apply QuantumChannel to QuantumState: rho' = sum_k K rho K†
    pub fn apply_channel(&mut self, channel: &QuantumChannel) {
        let mut new_rho = Array2::<Complex64>::zeros((2, 2));
        for k in &channel.kraus_ops {
            new_rho = new_rho + sandwich(k, &self.density_matrix);
        }
        self.density_matrix = new_rho;
        debug_assert!(self.is_valid().is_ok(), "channel broke the trace");
    }

    /// Returns the probability of each measurement outcome.
    pub fn probabilities(&self, measurement: &Measurement) -> Result<Vec<f64>, StateError> {
        let mut probs: Vec<f64> = measurement
            .operators
            .iter()
            .map(|op| {
                let p_k = trace(&sandwich(op, &self.density_matrix)).re;
                if p_k < PROBABILITY_FLOOR { 0.0 } else { p_k }
            })
            .collect();

        let sum_probs: f64 = probs.iter().sum();
        if sum_probs <= 0.0 {
            return Err(StateError::InvalidTrace(Complex64::new(sum_probs, 0.0)));
        }

        // Due to float, renormalization of probabilities to ensure completeness
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok(probs)
    }

    /// Randomly selects operator index ponderating using `probs`
    fn pick_outcome<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
        let roll: f64 = rng.random();

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if roll < cumulative {
                return i;
            }
        }
        // Rounding can leave the cumulative sum just under 1.0
        probs
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(probs.len().saturating_sub(1))
    }

    /// Physical measurement which changes the state irretrievably
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        measurement: &Measurement,
        rng: &mut R,
    ) -> Result<MeasurementResult, StateError> {
        let probs = self.probabilities(measurement)?;

        let outcome_idx = Self::pick_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];

        if p_selected <= PROBABILITY_FLOOR {
            return Err(StateError::ImpossibleOutcome { index: outcome_idx });
        }

        // rho' = (M_k * rho * M_k†) / p_k
        let numerator = sandwich(&measurement.operators[outcome_idx], &self.density_matrix);
        self.density_matrix = numerator.mapv(|val| val / Complex64::new(p_selected, 0.0));

        Ok(MeasurementResult {
            index: outcome_idx,
            probability: p_selected,
        })
    }
}
