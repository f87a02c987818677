// src/lib.rs

//! `vqec` - variational quantum error correction
//!
//! Estimates and optimizes the average fidelity of a variational quantum
//! error-correction scheme: gradient-free search over the parameters of
//! encoding and recovery circuits, steering toward the highest probability
//! that a logical state survives a noisy memory intact.
//!
//! The building blocks: a layered rotation ansatz ([`ansatz`]), a dense
//! statevector simulator with Monte-Carlo Kraus noise ([`simulation`],
//! [`noise`]), the memory-circuit fidelity estimator ([`fidelity`]) and
//! derivative-free minimizers ([`optimize`]).

pub mod core;
pub mod operations;
pub mod circuits;
pub mod ansatz;
pub mod noise;
pub mod simulation;
pub mod fidelity;
pub mod optimize;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::core::{CodeLayout, QecError, QubitId, Result, StateVector};
pub use crate::operations::Gate;
pub use crate::circuits::{Circuit, CircuitBuilder};
pub use crate::ansatz::{
    encode_circuit, haar_unitary, layered_circuit, parameter_count, random_parameters,
    recovery_circuit, sample_state_gate,
};
pub use crate::noise::{NoiseChannel, NoiseModel};
pub use crate::simulation::{Counts, Simulator};
pub use crate::fidelity::{
    DummyRunner, FidelityRunner, IdealRunner, MemoryExperiment, NoisyRunner,
    fidelity_from_counts,
};
pub use crate::optimize::{
    NelderMead, OptimizationOutcome, Optimizer, Spsa, optimize_memory,
};
pub use crate::validation::{check_normalization, check_probability, check_unitary};

// Example 1: An all-zero parameter vector describes the identity ansatz
// (every rotation angle is 0), so a noiseless run of the layered circuit
// leaves the register in |0...0> and every shot lands there.
/// ```
/// use vqec::{QubitId, Simulator, layered_circuit};
///
/// let qubits: Vec<QubitId> = (0..3).map(QubitId).collect();
/// let circuit = layered_circuit(&qubits, &vec![0.0; 8]).expect("valid ansatz inputs");
///
/// let simulator = Simulator::new().with_shots(128);
/// let counts = simulator.counts(&circuit).expect("simulation succeeds");
/// assert_eq!(counts.get(0), 128);
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: With identity encode/recovery and no noise, the memory circuit
// collapses to S followed by S†, so the state always survives and the
// fidelity metric (a failure fraction) is exactly zero.
/// ```
/// use vqec::{CodeLayout, IdealRunner, MemoryExperiment};
///
/// let layout = CodeLayout::new(1, 2, 1).expect("valid (k, n, r)");
/// let experiment = MemoryExperiment::new(layout).with_samples(2);
/// let runner = IdealRunner::new().with_shots(64);
///
/// let p = vec![0.0; 6]; // encoding half
/// let q = vec![0.0; 6]; // recovery half
/// match experiment.average_fidelity(&p, &q, &runner) {
///     Ok(average) => assert!(average.abs() < 1e-12, "perfect memory expected"),
///     Err(e) => panic!("fidelity estimation failed: {}", e),
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
