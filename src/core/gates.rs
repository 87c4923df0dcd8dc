use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a single-qubit quantum gate.
///
/// Polarization encoding only ever needs one qubit per photon, so every gate
/// is a 2x2 unitary.
#[derive(Clone, Debug)]
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if:
    /// - The matrix is not 2x2.
    /// - The matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != 2 || cols != 2 {
            return Err(GateError::InvalidDimensions { rows, cols });
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        Ok(Self { matrix })
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let eye = Array2::<Complex64>::eye(2);
        let product = matrix.dot(&utils::adjoint(matrix));

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < 1e-6)
    }

    // --- Standard Gates ---

    /// Creates a Pauli-X gate (NOT gate). Flips |0> into |1>.
    pub fn x() -> Gate {
        Gate {
            matrix: arr2(&[
                [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            ]),
        }
    }

    /// Creates a Hadamard gate. Rotates the rectilinear basis onto the diagonal one.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate {
            matrix: arr2(&[
                [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
                [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_gates_are_unitary() {
        assert!(Gate::new(Gate::x().matrix).is_ok());
        assert!(Gate::new(Gate::h().matrix).is_ok());
    }

    #[test]
    fn rejects_non_unitary_matrix() {
        let m = arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ]);
        assert_eq!(Gate::new(m).unwrap_err(), GateError::NonUnitary);
    }

    #[test]
    fn rejects_wrong_dimensions() {
        let m = Array2::<Complex64>::eye(4);
        assert_eq!(
            Gate::new(m).unwrap_err(),
            GateError::InvalidDimensions { rows: 4, cols: 4 }
        );
    }
}
