// src/core/error.rs

//! Error handling logic

use std::fmt;

/// Identifies a single qubit within a circuit or register.
///
/// Qubit ids double as register positions: the memory experiment places the
/// logical qubits at `0..k`, the syndrome qubits at `k..n` and the refresh
/// qubits at `n..n+r`. Qubit 0 is the most significant bit of a basis-state
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Error type for circuit construction, simulation and optimization failures.
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum QecError {
    /// A register partition (k, n, r) that does not describe a valid code.
    InvalidLayout {
        /// Layout failure message
        message: String,
    },

    /// An operation is malformed or inconsistent with the circuit it is
    /// applied to (duplicate targets, unknown qubit, shape mismatch).
    InvalidOperation {
        /// Operation failure message
        message: String,
    },

    /// A variational parameter vector with the wrong size or content.
    InvalidParameters {
        /// Parameter failure message
        message: String,
    },

    /// A channel or probability parameter outside its admissible range.
    InvalidChannel {
        /// Channel failure message
        message: String,
    },

    /// An attempt to invert something that has no inverse (noise sites).
    NonInvertible {
        /// Inversion failure message
        message: String,
    },

    /// Numerical breakdown (vanishing norm, degenerate random matrix,
    /// dimension overflow).
    Numerical {
        /// Numerical failure message
        message: String,
    },

    /// General error encountered while driving the simulation itself.
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// Failure inside the classical optimization loop.
    Optimization {
        /// Optimization failure message
        message: String,
    },
}

impl fmt::Display for QecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QecError::InvalidLayout { message } => write!(f, "Invalid layout: {}", message),
            QecError::InvalidOperation { message } => write!(f, "Invalid operation: {}", message),
            QecError::InvalidParameters { message } => write!(f, "Invalid parameters: {}", message),
            QecError::InvalidChannel { message } => write!(f, "Invalid channel: {}", message),
            QecError::NonInvertible { message } => write!(f, "Non-invertible: {}", message),
            QecError::Numerical { message } => write!(f, "Numerical error: {}", message),
            QecError::Simulation { message } => write!(f, "Simulation process error: {}", message),
            QecError::Optimization { message } => write!(f, "Optimization error: {}", message),
        }
    }
}

impl std::error::Error for QecError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QecError>;
