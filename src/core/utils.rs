//! Utility functions for single-qubit operations.
//!
//! This module contains helper functions for:
//! - Matrix operations (trace, adjoint, outer product).
//! - Completeness checks for measurements and channels.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Tolerance used when checking completeness relations.
const COMPLETENESS_TOL: f64 = 1e-9;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Conjugate transpose $M^\dagger$.
pub fn adjoint(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|c| c.conj())
}

/// Computes $M \rho M^\dagger$.
pub fn sandwich(op: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    op.dot(rho).dot(&adjoint(op))
}

/// Checks completeness relation for measurement or Kraus operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + adjoint(op).dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < COMPLETENESS_TOL)
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}
