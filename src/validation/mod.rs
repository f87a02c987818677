// src/validation/mod.rs

//! Numeric sanity checks shared by constructors, the engine and tests.

use crate::core::{QecError, Result, StateVector};
use num_complex::Complex;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
const DEFAULT_UNITARY_TOLERANCE: f64 = 1e-8;

/// Checks that the state vector is normalized (sum of squared amplitudes ≈ 1).
///
/// # Arguments
/// * `state` - The state to check.
/// * `tolerance` - Allowed deviation from 1.0; defaults to 1e-9.
///
/// # Errors
/// `QecError::Numerical` if the norm deviates beyond the tolerance.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq = state.total_probability();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(QecError::Numerical {
            message: format!(
                "state normalization failed: sum(|c_i|^2) = {} (deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that a row-major square matrix is unitary: U†U ≈ I.
///
/// # Arguments
/// * `matrix` - Square row-major matrix.
/// * `tolerance` - Allowed per-entry deviation; defaults to 1e-8.
///
/// # Errors
/// `QecError::Numerical` when a product entry strays from the identity.
pub fn check_unitary(matrix: &[Vec<Complex<f64>>], tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_UNITARY_TOLERANCE);
    let dim = matrix.len();
    for row in 0..dim {
        for col in 0..dim {
            // (U†U)[row][col] = Σ_m conj(U[m][row]) * U[m][col]
            let mut entry = Complex::new(0.0, 0.0);
            for m in matrix.iter() {
                entry += m[row].conj() * m[col];
            }
            let expected = if row == col { 1.0 } else { 0.0 };
            let deviation = (entry - Complex::new(expected, 0.0)).norm();
            if deviation > effective_tolerance {
                return Err(QecError::Numerical {
                    message: format!(
                        "matrix is not unitary: (U†U)[{}][{}] = {} deviates by {:.3e}",
                        row, col, entry, deviation
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Checks that `value` is a probability-like parameter in [0, 1].
///
/// # Errors
/// `QecError::InvalidChannel` naming the offending parameter otherwise.
pub fn check_probability(value: f64, name: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) && value.is_finite() {
        Ok(())
    } else {
        Err(QecError::InvalidChannel {
            message: format!("{} must be in [0, 1], got {}", name, value),
        })
    }
}
