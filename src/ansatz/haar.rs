// src/ansatz/haar.rs

//! Haar-random logical states.
//!
//! Average fidelity is estimated over uniformly random logical states, so
//! each sample needs a Haar-distributed unitary on the k logical qubits.
//! The standard construction: draw a complex Ginibre matrix (i.i.d. Gaussian
//! entries) and orthonormalize its columns. Modified Gram-Schmidt yields a
//! QR factorization whose R has a positive real diagonal, which makes the Q
//! factor exactly Haar-distributed.

use crate::core::{CodeLayout, QecError, Result};
use crate::operations::Gate;
use num_complex::Complex;
use num_traits::Zero;
use rand::RngExt;
use rand::rngs::StdRng;

const MAX_DRAW_ATTEMPTS: usize = 4;
const DEGENERACY_TOLERANCE: f64 = 1e-12;

/// Draws a Haar-distributed 2^k × 2^k unitary matrix (row-major).
///
/// # Errors
/// Fails if the dimension overflows, or (with vanishing probability) if
/// repeated Ginibre draws are numerically degenerate.
pub fn haar_unitary(qubit_count: usize, rng: &mut StdRng) -> Result<Vec<Vec<Complex<f64>>>> {
    if qubit_count == 0 {
        return Err(QecError::InvalidOperation {
            message: "a Haar unitary needs at least one qubit".to_string(),
        });
    }
    let dim = 1usize
        .checked_shl(qubit_count as u32)
        .ok_or_else(|| QecError::Numerical {
            message: format!("{} qubits: Haar unitary dimension overflows usize", qubit_count),
        })?;

    for _ in 0..MAX_DRAW_ATTEMPTS {
        if let Some(unitary) = try_orthonormalize(ginibre(dim, rng)) {
            return Ok(unitary);
        }
    }
    Err(QecError::Numerical {
        message: format!(
            "Ginibre draws stayed degenerate over {} attempts",
            MAX_DRAW_ATTEMPTS
        ),
    })
}

/// Builds the sampled-state gate S over the logical qubits of a layout.
pub fn sample_state_gate(layout: &CodeLayout, rng: &mut StdRng) -> Result<Gate> {
    let matrix = haar_unitary(layout.logical(), rng)?;
    Gate::unitary(layout.logical_qubits(), matrix, "S")
}

// Complex matrix with i.i.d. standard-normal real and imaginary parts.
fn ginibre(dim: usize, rng: &mut StdRng) -> Vec<Vec<Complex<f64>>> {
    (0..dim)
        .map(|_| {
            (0..dim)
                .map(|_| Complex::new(standard_normal(rng), standard_normal(rng)))
                .collect()
        })
        .collect()
}

/// Modified Gram-Schmidt over the columns. Returns `None` when a column
/// collapses below tolerance (degenerate draw).
fn try_orthonormalize(matrix: Vec<Vec<Complex<f64>>>) -> Option<Vec<Vec<Complex<f64>>>> {
    let dim = matrix.len();
    // Work column-wise: columns[j][r] is entry (r, j).
    let mut columns: Vec<Vec<Complex<f64>>> = (0..dim)
        .map(|j| (0..dim).map(|r| matrix[r][j]).collect())
        .collect();

    for j in 0..dim {
        for l in 0..j {
            // Project out the already-orthonormal column l.
            let overlap: Complex<f64> = columns[l]
                .iter()
                .zip(columns[j].iter())
                .map(|(a, b)| a.conj() * b)
                .sum();
            for r in 0..dim {
                let correction = overlap * columns[l][r];
                columns[j][r] -= correction;
            }
        }
        let norm: f64 = columns[j].iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if norm < DEGENERACY_TOLERANCE {
            return None;
        }
        let scale = norm.recip();
        for entry in &mut columns[j] {
            *entry *= scale;
        }
    }

    // Back to row-major.
    let mut out = vec![vec![Complex::zero(); dim]; dim];
    for (j, column) in columns.iter().enumerate() {
        for (r, entry) in column.iter().enumerate() {
            out[r][j] = *entry;
        }
    }
    Some(out)
}

// Box-Muller from two uniforms; the 1 - u shift keeps the log argument
// strictly positive.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
