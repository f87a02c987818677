// src/ansatz/mod.rs

//! The variational circuit family shared by encoding and recovery.
//!
//! A flat parameter vector in [0, 1) is mapped onto rotation angles
//! (θ = parameter × 2π) and consumed in a fixed round-robin order: an Rz
//! layer over all qubits, an Rx layer over all qubits, then controlled-Rz
//! gates across neighboring pairs, repeating until every parameter has been
//! used exactly once. A trailing partial layer is permitted, so any vector
//! length describes a valid circuit and deeper circuits simply take more
//! parameters.

pub mod haar;

pub use haar::{haar_unitary, sample_state_gate};

use crate::circuits::Circuit;
use crate::core::constants::TWO_PI;
use crate::core::{CodeLayout, QecError, QubitId, Result};
use crate::operations::Gate;
use rand::RngExt;
use rand::rngs::StdRng;

/// Builds the layered rotation circuit over `qubits` described by `params`.
///
/// # Errors
/// Fails on an empty qubit slice or an empty parameter vector.
pub fn layered_circuit(qubits: &[QubitId], params: &[f64]) -> Result<Circuit> {
    if qubits.is_empty() {
        return Err(QecError::InvalidOperation {
            message: "layered circuit needs at least one qubit".to_string(),
        });
    }
    if params.is_empty() {
        return Err(QecError::InvalidParameters {
            message: "layered circuit needs at least one parameter".to_string(),
        });
    }

    let mut circuit = Circuit::new();
    let mut index = 0;

    'cycles: loop {
        for qubit in qubits {
            let Some(&p) = params.get(index) else {
                break 'cycles;
            };
            index += 1;
            circuit.add_gate(Gate::Rz {
                target: *qubit,
                theta: p * TWO_PI,
            });
        }

        for qubit in qubits {
            let Some(&p) = params.get(index) else {
                break 'cycles;
            };
            index += 1;
            circuit.add_gate(Gate::Rx {
                target: *qubit,
                theta: p * TWO_PI,
            });
        }

        for pair in qubits.windows(2) {
            let Some(&p) = params.get(index) else {
                break 'cycles;
            };
            index += 1;
            circuit.add_gate(Gate::ControlledRz {
                control: pair[0],
                target: pair[1],
                theta: p * TWO_PI,
            });
        }
    }

    Ok(circuit)
}

/// The encoding circuit: the layered ansatz over the encode register `0..n`.
pub fn encode_circuit(layout: &CodeLayout, params: &[f64]) -> Result<Circuit> {
    layered_circuit(&layout.encode_qubits(), params)
}

/// The recovery circuit: the layered ansatz over the full register `0..n+r`,
/// refresh ancillas included.
pub fn recovery_circuit(layout: &CodeLayout, params: &[f64]) -> Result<Circuit> {
    layered_circuit(&layout.recovery_qubits(), params)
}

/// Total length of the flat optimizer vector for a layout and cycle count:
/// 3·(n+r) parameters per cycle for each of the encode and recovery halves.
/// The vector splits as p = x[..len/2] (encoding), q = x[len/2..] (recovery).
pub fn parameter_count(layout: &CodeLayout, cycles: usize) -> usize {
    cycles * layout.total() * 3 * 2
}

/// Draws a uniform [0, 1) parameter vector of the given length.
pub fn random_parameters(len: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..len).map(|_| rng.random::<f64>()).collect()
}
