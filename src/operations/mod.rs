// src/operations/mod.rs

//! The gate set the fidelity experiments are assembled from.
//!
//! The set is deliberately small: the variational ansatz only ever emits
//! `Rz`/`Rx`/`ControlledRz`, the sampled logical state enters as a dense
//! `Unitary`, and `Noise` marks the circuit positions where the simulator's
//! configured channel fires. Anything the memory experiment does not need
//! stays out.

use crate::core::{QecError, QubitId, Result};
use crate::validation::check_unitary;
use num_complex::Complex;

/// A single operation in a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Z-axis rotation by `theta` radians, diag(e^{-iθ/2}, e^{iθ/2}).
    Rz {
        /// Rotated qubit.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// X-axis rotation by `theta` radians.
    Rx {
        /// Rotated qubit.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// Rz on `target`, applied only in the control's |1⟩ subspace. The
    /// entangling gate of the ansatz, placed across neighboring qubit pairs.
    ControlledRz {
        /// Gating qubit.
        control: QubitId,
        /// Rotated qubit.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// A dense 2^m × 2^m unitary over `targets`. Used for the Haar-sampled
    /// logical state and its adjoint; `targets[0]` carries the most
    /// significant bit of the matrix's basis ordering.
    Unitary {
        /// Qubits the matrix acts on, most significant first.
        targets: Vec<QubitId>,
        /// Row-major unitary matrix.
        matrix: Vec<Vec<Complex<f64>>>,
        /// Display label, e.g. "S" or "S†".
        label: String,
    },

    /// A noise injection site. Each listed qubit passes through the
    /// simulator's configured channel independently; under an ideal
    /// simulator the site is the identity.
    Noise {
        /// Qubits exposed to the channel.
        targets: Vec<QubitId>,
    },
}

impl Gate {
    /// Builds a validated dense-unitary gate.
    ///
    /// # Errors
    /// Fails if `targets` is empty or contains duplicates, if the matrix is
    /// not square with dimension 2^targets.len(), or if it is not unitary
    /// within numerical tolerance.
    pub fn unitary(
        targets: Vec<QubitId>,
        matrix: Vec<Vec<Complex<f64>>>,
        label: impl Into<String>,
    ) -> Result<Self> {
        if targets.is_empty() {
            return Err(QecError::InvalidOperation {
                message: "unitary gate needs at least one target".to_string(),
            });
        }
        let mut seen = targets.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != targets.len() {
            return Err(QecError::InvalidOperation {
                message: "unitary gate targets must be distinct".to_string(),
            });
        }
        let dim = 1usize
            .checked_shl(targets.len() as u32)
            .ok_or_else(|| QecError::Numerical {
                message: "unitary gate dimension overflows usize".to_string(),
            })?;
        if matrix.len() != dim || matrix.iter().any(|row| row.len() != dim) {
            return Err(QecError::InvalidOperation {
                message: format!(
                    "unitary on {} qubit(s) must be {}x{}, got {} row(s)",
                    targets.len(),
                    dim,
                    dim,
                    matrix.len()
                ),
            });
        }
        check_unitary(&matrix, None)?;
        Ok(Gate::Unitary {
            targets,
            matrix,
            label: label.into(),
        })
    }

    /// All qubit ids the gate touches, in declaration order.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::Rz { target, .. } => vec![*target],
            Gate::Rx { target, .. } => vec![*target],
            Gate::ControlledRz {
                control, target, ..
            } => vec![*control, *target],
            Gate::Unitary { targets, .. } => targets.clone(),
            Gate::Noise { targets } => targets.clone(),
        }
    }

    /// The inverse gate: rotations negate their angle, dense unitaries take
    /// the conjugate transpose.
    ///
    /// # Errors
    /// `Noise` sites are channels, not unitaries, and cannot be inverted.
    pub fn adjoint(&self) -> Result<Gate> {
        match self {
            Gate::Rz { target, theta } => Ok(Gate::Rz {
                target: *target,
                theta: -theta,
            }),
            Gate::Rx { target, theta } => Ok(Gate::Rx {
                target: *target,
                theta: -theta,
            }),
            Gate::ControlledRz {
                control,
                target,
                theta,
            } => Ok(Gate::ControlledRz {
                control: *control,
                target: *target,
                theta: -theta,
            }),
            Gate::Unitary {
                targets,
                matrix,
                label,
            } => Ok(Gate::Unitary {
                targets: targets.clone(),
                matrix: conjugate_transpose(matrix),
                label: adjoint_label(label),
            }),
            Gate::Noise { .. } => Err(QecError::NonInvertible {
                message: "noise sites have no adjoint".to_string(),
            }),
        }
    }
}

/// Conjugate transpose of a row-major square matrix.
pub(crate) fn conjugate_transpose(matrix: &[Vec<Complex<f64>>]) -> Vec<Vec<Complex<f64>>> {
    let dim = matrix.len();
    let mut out = vec![vec![Complex::new(0.0, 0.0); dim]; dim];
    for (r, row) in matrix.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            out[c][r] = value.conj();
        }
    }
    out
}

// "S" -> "S†", "S†" -> "S"
fn adjoint_label(label: &str) -> String {
    match label.strip_suffix('†') {
        Some(base) => base.to_string(),
        None => format!("{}†", label),
    }
}
