use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

/// A projective single-qubit measurement.
///
/// Outcome `k` corresponds to `operators[k]`; for the two polarization bases
/// outcome 0 reads as bit 0 and outcome 1 as bit 1.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators
    pub operators: Vec<Array2<Complex64>>,
}

impl Measurement {
    pub fn new(operators: Vec<Array2<Complex64>>) -> Result<Self, MeasurementError> {
        if operators.is_empty() {
            return Err(MeasurementError::Empty);
        }

        if operators.iter().any(|op| op.dim() != (2, 2)) {
            return Err(MeasurementError::InvalidDimensions);
        }

        if !utils::check_completeness(&operators, 2) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self { operators })
    }

    /// Z basis (Computational, rectilinear polarization) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Measurement {
            operators: vec![utils::outer_product(&v0, &v0), utils::outer_product(&v1, &v1)],
        }
    }

    /// X basis (Hadamard, diagonal polarization) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        let v_plus: Array1<Complex64> = array![inv_sqrt2, inv_sqrt2];
        let v_minus: Array1<Complex64> = array![inv_sqrt2, -inv_sqrt2];

        Measurement {
            operators: vec![
                utils::outer_product(&v_plus, &v_plus),
                utils::outer_product(&v_minus, &v_minus),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Applied measurement operator index
    pub index: usize,
    /// Probability the outcome had before collapse
    pub probability: f64,
}

impl MeasurementResult {
    /// Reads a two-outcome measurement as a classical bit.
    pub fn bit(&self) -> bool {
        self.index == 1
    }
}
