// src/core/state.rs

use num_complex::Complex;
use std::fmt;

/// Dense complex amplitudes over the 2^N computational basis states of a
/// simulated register.
///
/// The basis ordering follows the register ordering: qubit 0 contributes the
/// most significant bit of a basis index, the last qubit the least
/// significant one. The engine is responsible for keeping the vector
/// normalized; trajectory simulation renormalizes after every sampled Kraus
/// operator.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// Creates a state from a raw amplitude vector. Validity (power-of-two
    /// length, normalization) is the caller's concern; the engine constructs
    /// states internally and `validation::check_normalization` is available
    /// for callers that need the invariant checked.
    pub(crate) fn new(amplitudes: Vec<Complex<f64>>) -> Self {
        Self { amplitudes }
    }

    /// Read-only access to the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    /// Dimension of the state vector (2^N for N qubits).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Probability of observing the given basis state, |amplitude|^2.
    pub fn probability(&self, basis_index: usize) -> f64 {
        self.amplitudes
            .get(basis_index)
            .map(|a| a.norm_sqr())
            .unwrap_or(0.0)
    }

    /// Sum of all basis probabilities. 1.0 for a normalized state.
    pub fn total_probability(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
