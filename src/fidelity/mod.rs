// src/fidelity/mod.rs

//! Average-fidelity estimation for a noisy quantum memory.
//!
//! One fidelity sample assembles the full memory circuit
//!
//! ```text
//! S → encode(p) → { noise(0..n) → recovery(q) } × m → encode(p)† → S†
//! ```
//!
//! over the n+r qubit register, runs it through a `FidelityRunner` and reads
//! the surviving all-zero fraction. A perfectly preserved state is mapped
//! back to |0...0⟩ by the closing inverses, so the reported metric
//! 1 − frequency(|0...0⟩) is a failure fraction: 0.0 is a perfect memory and
//! the optimizer minimizes it. Averaging over Haar-random logical states S
//! gives the estimate the optimizer steers by.

use crate::ansatz::{encode_circuit, recovery_circuit, sample_state_gate};
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::constants::{
    DEFAULT_DAMPING, DEFAULT_FIDELITY_SAMPLES, DEFAULT_RECOVERY_ROUNDS, DEFAULT_SEED,
};
use crate::core::{CodeLayout, QecError, Result};
use crate::noise::{NoiseChannel, NoiseModel};
use crate::operations::Gate;
use crate::simulation::{Counts, Simulator, derive_seed};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// The fidelity metric over measurement statistics: 1 minus the fraction of
/// shots landing in the all-zero basis state. Lower is better.
pub fn fidelity_from_counts(counts: &Counts) -> f64 {
    1.0 - counts.frequency(0)
}

/// Something that can execute a memory circuit and report the fidelity
/// metric for it.
pub trait FidelityRunner {
    /// Measurement statistics for the circuit.
    fn counts(&self, circuit: &Circuit) -> Result<Counts>;

    /// The fidelity metric; by default, `fidelity_from_counts` over
    /// `counts`.
    fn fidelity(&self, circuit: &Circuit) -> Result<f64> {
        Ok(fidelity_from_counts(&self.counts(circuit)?))
    }
}

/// Runs circuits on a noiseless simulator; noise sites act as identities.
#[derive(Debug, Clone, Default)]
pub struct IdealRunner {
    simulator: Simulator,
}

impl IdealRunner {
    /// A runner around a fresh ideal simulator.
    pub fn new() -> Self {
        Self {
            simulator: Simulator::new(),
        }
    }

    /// Replaces the shot count.
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.simulator = self.simulator.with_shots(shots);
        self
    }

    /// Replaces the simulator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulator = self.simulator.with_seed(seed);
        self
    }
}

impl FidelityRunner for IdealRunner {
    fn counts(&self, circuit: &Circuit) -> Result<Counts> {
        self.simulator.counts(circuit)
    }
}

/// Runs circuits with a noise channel attached to every noise site.
#[derive(Debug, Clone)]
pub struct NoisyRunner {
    simulator: Simulator,
}

impl NoisyRunner {
    /// A runner firing `channel` at every noise site.
    pub fn new(channel: NoiseChannel) -> Self {
        Self {
            simulator: Simulator::new().with_noise(NoiseModel::with_channel(channel)),
        }
    }

    /// The default memory channel: per-qubit amplitude damping with the
    /// stock damping parameter.
    pub fn default_damping() -> Self {
        Self::new(NoiseChannel::AmplitudeDamping {
            gamma: DEFAULT_DAMPING,
        })
    }

    /// Replaces the shot count.
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.simulator = self.simulator.with_shots(shots);
        self
    }

    /// Replaces the simulator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulator = self.simulator.with_seed(seed);
        self
    }
}

impl FidelityRunner for NoisyRunner {
    fn counts(&self, circuit: &Circuit) -> Result<Counts> {
        self.simulator.counts(circuit)
    }
}

/// Reports a constant perfect fidelity without simulating anything. Useful
/// for exercising the orchestration and the optimizer plumbing cheaply.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyRunner;

impl FidelityRunner for DummyRunner {
    fn counts(&self, _circuit: &Circuit) -> Result<Counts> {
        Err(QecError::InvalidOperation {
            message: "the dummy runner reports fidelity only".to_string(),
        })
    }

    fn fidelity(&self, _circuit: &Circuit) -> Result<f64> {
        Ok(1.0)
    }
}

/// The noisy-memory experiment: layout plus averaging configuration.
#[derive(Debug, Clone)]
pub struct MemoryExperiment {
    layout: CodeLayout,
    samples: usize,
    recovery_rounds: usize,
    seed: u64,
}

impl MemoryExperiment {
    /// An experiment over `layout` with stock averaging settings.
    pub fn new(layout: CodeLayout) -> Self {
        Self {
            layout,
            samples: DEFAULT_FIDELITY_SAMPLES,
            recovery_rounds: DEFAULT_RECOVERY_ROUNDS,
            seed: DEFAULT_SEED,
        }
    }

    /// Replaces the number of sampled logical states per estimate.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Replaces the number of noise/recovery rounds in the memory.
    pub fn with_recovery_rounds(mut self, rounds: usize) -> Self {
        self.recovery_rounds = rounds;
        self
    }

    /// Replaces the seed driving the sample-state stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The register layout of the experiment.
    pub fn layout(&self) -> &CodeLayout {
        &self.layout
    }

    /// The configured sample count.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The configured seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Assembles one memory circuit for a given sampled state.
    ///
    /// # Errors
    /// Fails if either parameter half is empty or the sample gate is
    /// malformed.
    pub fn memory_circuit(
        &self,
        encode_params: &[f64],
        recovery_params: &[f64],
        sample: &Gate,
    ) -> Result<Circuit> {
        let encode = encode_circuit(&self.layout, encode_params)?;
        let recovery = recovery_circuit(&self.layout, recovery_params)?;
        let decode = encode.inverse()?;
        let unprepare = sample.adjoint()?;

        let mut builder = CircuitBuilder::new()
            .add_gate(sample.clone())
            .add_circuit(&encode);
        for _ in 0..self.recovery_rounds {
            builder = builder
                .add_gate(Gate::Noise {
                    targets: self.layout.encode_qubits(),
                })
                .add_circuit(&recovery);
        }
        Ok(builder
            .add_circuit(&decode)
            .add_gate(unprepare)
            .build())
    }

    /// Estimates the average fidelity metric of the memory described by the
    /// parameter halves (p for encoding, q for recovery), averaged over
    /// Haar-random logical states. The sample stream is derived from the
    /// experiment seed, so estimates are reproducible.
    ///
    /// # Errors
    /// Fails on a zero sample count or if circuit assembly or the runner
    /// fail.
    pub fn average_fidelity<R: FidelityRunner>(
        &self,
        encode_params: &[f64],
        recovery_params: &[f64],
        runner: &R,
    ) -> Result<f64> {
        if self.samples == 0 {
            return Err(QecError::InvalidParameters {
                message: "fidelity averaging needs at least one sample".to_string(),
            });
        }

        let mut sum = 0.0;
        for sample_index in 0..self.samples {
            let mut rng =
                StdRng::seed_from_u64(derive_seed(self.seed, sample_index as u64));
            let sample = sample_state_gate(&self.layout, &mut rng)?;
            let circuit = self.memory_circuit(encode_params, recovery_params, &sample)?;
            let fidelity = runner.fidelity(&circuit)?;
            debug!(sample_index, fidelity, "memory sample evaluated");
            sum += fidelity;
        }
        Ok(sum / self.samples as f64)
    }
}
