// src/core/layout.rs

use super::error::{QecError, QubitId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Register partition of a variational code.
///
/// A layout is described by three counts:
/// - `logical` (k): qubits carrying the protected state,
/// - `physical` (n): the encode register, i.e. logical plus syndrome qubits,
/// - `refresh` (r): ancillas available only to the recovery circuit.
///
/// The encode circuit acts on qubits `0..n`, the recovery circuit on
/// `0..n+r`, and noise is injected on `0..n` only; refresh qubits pass
/// through the memory noise-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeLayout {
    logical: usize,
    physical: usize,
    refresh: usize,
}

impl CodeLayout {
    /// Creates a layout from (k, n, r).
    ///
    /// # Errors
    /// Fails unless `k >= 1` and `n >= k`.
    pub fn new(logical: usize, physical: usize, refresh: usize) -> Result<Self> {
        if logical == 0 {
            return Err(QecError::InvalidLayout {
                message: "a code needs at least one logical qubit".to_string(),
            });
        }
        if physical < logical {
            return Err(QecError::InvalidLayout {
                message: format!(
                    "physical register ({}) cannot be smaller than the logical register ({})",
                    physical, logical
                ),
            });
        }
        Ok(Self {
            logical,
            physical,
            refresh,
        })
    }

    /// Number of logical qubits (k).
    pub fn logical(&self) -> usize {
        self.logical
    }

    /// Size of the encode register (n).
    pub fn physical(&self) -> usize {
        self.physical
    }

    /// Number of syndrome qubits (n - k).
    pub fn syndrome(&self) -> usize {
        self.physical - self.logical
    }

    /// Number of refresh ancillas (r).
    pub fn refresh(&self) -> usize {
        self.refresh
    }

    /// Total register width (n + r).
    pub fn total(&self) -> usize {
        self.physical + self.refresh
    }

    /// Qubits holding the sampled logical state, `0..k`.
    pub fn logical_qubits(&self) -> Vec<QubitId> {
        (0..self.logical).map(QubitId).collect()
    }

    /// Qubits the encode circuit (and the noise) acts on, `0..n`.
    pub fn encode_qubits(&self) -> Vec<QubitId> {
        (0..self.physical).map(QubitId).collect()
    }

    /// Qubits the recovery circuit acts on, `0..n+r`.
    pub fn recovery_qubits(&self) -> Vec<QubitId> {
        (0..self.total()).map(QubitId).collect()
    }
}

impl fmt::Display for CodeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{},{}]] + {} refresh",
            self.physical, self.logical, self.refresh
        )
    }
}
