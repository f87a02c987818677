// src/simulation/mod.rs

//! Executes circuits: statevector evolution, trajectory noise and
//! measurement sampling.
//!
//! The `Simulator` is the public entry point; the crate-internal
//! `SimulationEngine` does the actual state manipulation. Sampling is
//! reproducible for a fixed seed. With a noise model attached, every shot is
//! an independent Kraus trajectory; without one, the circuit is evolved once
//! and the shot histogram is drawn from the final distribution.

mod results;
pub(crate) mod engine;

pub use results::Counts;

use crate::circuits::Circuit;
use crate::core::constants::{DEFAULT_SEED, DEFAULT_SHOTS};
use crate::core::{QecError, Result, StateVector};
use crate::noise::NoiseModel;
use engine::SimulationEngine;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Executes circuits under a configured noise model, shot count and seed.
#[derive(Debug, Clone)]
pub struct Simulator {
    noise: NoiseModel,
    shots: usize,
    seed: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// An ideal simulator with the default shot count and seed.
    pub fn new() -> Self {
        Self {
            noise: NoiseModel::ideal(),
            shots: DEFAULT_SHOTS,
            seed: DEFAULT_SEED,
        }
    }

    /// Replaces the noise model.
    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    /// Replaces the shot count used by `counts`.
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    /// Replaces the base seed. Derived streams keep shots and fidelity
    /// samples statistically independent while staying reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The configured noise model.
    pub fn noise(&self) -> &NoiseModel {
        &self.noise
    }

    /// The configured shot count.
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// The configured base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evolves a single trajectory of the circuit and returns the final
    /// state. Noise sites sample Kraus operators along the way, so under a
    /// non-ideal model two calls with different seeds generally disagree.
    ///
    /// # Errors
    /// Fails on empty circuits, malformed gates or numerical breakdown.
    pub fn run(&self, circuit: &Circuit) -> Result<StateVector> {
        if circuit.is_empty() {
            return Err(QecError::InvalidOperation {
                message: "cannot simulate an empty circuit".to_string(),
            });
        }
        let mut engine = SimulationEngine::init(circuit.qubits())?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        for gate in circuit.gates() {
            engine.apply_gate(gate, &self.noise, &mut rng)?;
        }
        Ok(engine.state().clone())
    }

    /// Samples measurement statistics over all circuit qubits.
    ///
    /// Ideal model: one deterministic evolution followed by multinomial
    /// sampling of `shots` outcomes. Noisy model: one independent trajectory
    /// per shot (parallelized), one sample each.
    ///
    /// # Errors
    /// Fails on empty circuits, a zero shot count, or simulation failure.
    pub fn counts(&self, circuit: &Circuit) -> Result<Counts> {
        if circuit.is_empty() {
            return Err(QecError::InvalidOperation {
                message: "cannot sample an empty circuit".to_string(),
            });
        }
        if self.shots == 0 {
            return Err(QecError::InvalidOperation {
                message: "shot count must be positive".to_string(),
            });
        }

        let needs_trajectories = !self.noise.is_ideal() && circuit.has_noise();
        let mut counts = Counts::new(circuit.qubit_count());

        if needs_trajectories {
            let outcomes: Vec<u64> = (0..self.shots)
                .into_par_iter()
                .map(|shot| {
                    let shot_seed = derive_seed(self.seed, shot as u64);
                    let mut rng = StdRng::seed_from_u64(shot_seed);
                    let mut engine = SimulationEngine::init(circuit.qubits())?;
                    for gate in circuit.gates() {
                        engine.apply_gate(gate, &self.noise, &mut rng)?;
                    }
                    engine.measure(&mut rng)
                })
                .collect::<Result<Vec<u64>>>()?;
            for outcome in outcomes {
                counts.record(outcome);
            }
        } else {
            let mut engine = SimulationEngine::init(circuit.qubits())?;
            let mut rng = StdRng::seed_from_u64(self.seed);
            for gate in circuit.gates() {
                engine.apply_gate(gate, &self.noise, &mut rng)?;
            }
            for _ in 0..self.shots {
                counts.record(engine.measure(&mut rng)?);
            }
        }

        Ok(counts)
    }
}

/// Splitmix64-style mixing of a base seed and a stream index, so parallel
/// shots and fidelity samples get decorrelated but reproducible generators.
pub(crate) fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use crate::core::QubitId;
    use crate::noise::NoiseChannel;
    use crate::operations::Gate;
    use num_complex::Complex;
    use std::f64::consts::PI;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn qid(id: usize) -> QubitId {
        QubitId(id)
    }

    /// Asserts two complex vectors agree component-wise within tolerance.
    fn assert_complex_vec_approx_equal(
        actual: &[Complex<f64>],
        expected: &[Complex<f64>],
        context: &str,
    ) {
        assert_eq!(actual.len(), expected.len(), "length mismatch - {}", context);
        for i in 0..actual.len() {
            let dist_sq = (actual[i] - expected[i]).norm_sqr();
            assert!(
                dist_sq < TEST_TOLERANCE * TEST_TOLERANCE,
                "mismatch at index {} - actual: {}, expected: {}, context: {}",
                i,
                actual[i],
                expected[i],
                context
            );
        }
    }

    #[test]
    fn rx_pi_flips_a_qubit() {
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .build();
        let state = Simulator::new().run(&circuit).unwrap();
        // Rx(π)|0⟩ = -i|1⟩
        let expected = vec![Complex::new(0.0, 0.0), Complex::new(0.0, -1.0)];
        assert_complex_vec_approx_equal(state.amplitudes(), &expected, "Rx(π)|0⟩");
    }

    #[test]
    fn rx_pi_on_middle_qubit_of_three() {
        // Exercises the bit-indexed pair iteration away from the register
        // edges: |000⟩ -> -i|010⟩ (qubit 0 is the most significant bit).
        let circuit = CircuitBuilder::new()
            .add_gates((0..3).map(|q| Gate::Rz {
                target: qid(q),
                theta: 0.0,
            }))
            .add_gate(Gate::Rx {
                target: qid(1),
                theta: PI,
            })
            .build();
        let state = Simulator::new().run(&circuit).unwrap();
        let mut expected = vec![Complex::new(0.0, 0.0); 8];
        expected[0b010] = Complex::new(0.0, -1.0);
        assert_complex_vec_approx_equal(state.amplitudes(), &expected, "Rx(π) on q1 of 3");
    }

    #[test]
    fn controlled_rz_is_identity_on_zero_control() {
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rz {
                target: qid(0),
                theta: 0.0,
            })
            .add_gate(Gate::ControlledRz {
                control: qid(0),
                target: qid(1),
                theta: 1.3,
            })
            .build();
        let state = Simulator::new().run(&circuit).unwrap();
        let mut expected = vec![Complex::new(0.0, 0.0); 4];
        expected[0] = Complex::new(1.0, 0.0);
        assert_complex_vec_approx_equal(state.amplitudes(), &expected, "CRz on |00⟩");
    }

    #[test]
    fn controlled_rz_rotates_target_phase_on_one_control() {
        let theta = 0.8;
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .add_gate(Gate::Rx {
                target: qid(1),
                theta: PI,
            })
            .add_gate(Gate::ControlledRz {
                control: qid(0),
                target: qid(1),
                theta,
            })
            .build();
        let state = Simulator::new().run(&circuit).unwrap();
        // Rx(π)Rx(π)|00⟩ = -|11⟩; CRz multiplies |11⟩ by e^{iθ/2}.
        let half = theta / 2.0;
        let mut expected = vec![Complex::new(0.0, 0.0); 4];
        expected[0b11] = Complex::new(-half.cos(), -half.sin());
        assert_complex_vec_approx_equal(state.amplitudes(), &expected, "CRz on |11⟩");
    }

    #[test]
    fn dense_unitary_applies_on_subset() {
        // Swap-like unitary on (q0, q2) of a 3-qubit register, exercising
        // non-adjacent targets: X⊗X sends |00⟩ -> |11⟩ in the sub-basis.
        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        let xx = vec![
            vec![zero, zero, zero, one],
            vec![zero, zero, one, zero],
            vec![zero, one, zero, zero],
            vec![one, zero, zero, zero],
        ];
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rz {
                target: qid(1),
                theta: 0.0,
            })
            .add_gate(Gate::unitary(vec![qid(0), qid(2)], xx, "XX").unwrap())
            .build();
        let state = Simulator::new().run(&circuit).unwrap();
        let mut expected = vec![Complex::new(0.0, 0.0); 8];
        expected[0b101] = Complex::new(1.0, 0.0);
        assert_complex_vec_approx_equal(state.amplitudes(), &expected, "X⊗X on q0,q2");
    }

    #[test]
    fn ideal_counts_are_deterministic_for_basis_states() {
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .add_gate(Gate::Rx {
                target: qid(1),
                theta: PI,
            })
            .build();
        let counts = Simulator::new().with_shots(256).counts(&circuit).unwrap();
        assert_eq!(counts.shots(), 256);
        assert_eq!(counts.get(0b11), 256);
    }

    #[test]
    fn full_damping_resets_excited_qubit() {
        // γ = 1 sends |1⟩ to |0⟩ on every trajectory, so the counts are
        // deterministic even though each shot samples Kraus operators.
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .add_gate(Gate::Noise {
                targets: vec![qid(0)],
            })
            .build();
        let noise = NoiseModel::with_channel(NoiseChannel::amplitude_damping(1.0).unwrap());
        let counts = Simulator::new()
            .with_noise(noise)
            .with_shots(128)
            .counts(&circuit)
            .unwrap();
        assert_eq!(counts.get(0), 128);
    }

    #[test]
    fn noise_sites_are_identity_under_ideal_model() {
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .add_gate(Gate::Noise {
                targets: vec![qid(0)],
            })
            .build();
        let counts = Simulator::new().with_shots(64).counts(&circuit).unwrap();
        assert_eq!(counts.get(0b1), 64);
    }

    #[test]
    fn partial_damping_splits_counts() {
        // γ = 0.25 on |1⟩: P(decay to |0⟩) = 0.25. With 2048 shots the
        // observed fraction should be in a comfortably wide window.
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI,
            })
            .add_gate(Gate::Noise {
                targets: vec![qid(0)],
            })
            .build();
        let noise = NoiseModel::with_channel(NoiseChannel::amplitude_damping(0.25).unwrap());
        let counts = Simulator::new()
            .with_noise(noise)
            .with_shots(2048)
            .counts(&circuit)
            .unwrap();
        let decayed = counts.frequency(0);
        assert!(
            (0.15..0.35).contains(&decayed),
            "decay fraction {} outside window",
            decayed
        );
    }

    #[test]
    fn same_seed_reproduces_counts() {
        let circuit = CircuitBuilder::new()
            .add_gate(Gate::Rx {
                target: qid(0),
                theta: PI / 3.0,
            })
            .add_gate(Gate::Noise {
                targets: vec![qid(0)],
            })
            .build();
        let noise = NoiseModel::with_channel(NoiseChannel::amplitude_damping(0.3).unwrap());
        let make = || {
            Simulator::new()
                .with_noise(noise)
                .with_shots(128)
                .with_seed(42)
                .counts(&circuit)
                .unwrap()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn empty_circuit_is_rejected() {
        let circuit = crate::circuits::Circuit::new();
        assert!(matches!(
            Simulator::new().run(&circuit),
            Err(QecError::InvalidOperation { .. })
        ));
        assert!(matches!(
            Simulator::new().counts(&circuit),
            Err(QecError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn derived_seeds_differ_between_streams() {
        let a = derive_seed(7, 0);
        let b = derive_seed(7, 1);
        assert_ne!(a, b);
        assert_eq!(a, derive_seed(7, 0));
    }

    #[test]
    fn engine_rejects_mismatched_set_state() {
        use std::collections::HashSet;
        let qubits: HashSet<QubitId> = [qid(0), qid(1)].into_iter().collect();
        let mut engine = SimulationEngine::init(&qubits).unwrap();
        let wrong = StateVector::new(vec![Complex::new(1.0, 0.0); 2]);
        assert!(engine.set_state(wrong).is_err());
    }

    #[test]
    fn probabilities_sum_to_one_after_rotation() {
        use std::collections::HashSet;
        let qubits: HashSet<QubitId> = [qid(0), qid(1)].into_iter().collect();
        let mut engine = SimulationEngine::init(&qubits).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        engine
            .apply_gate(
                &Gate::Rx {
                    target: qid(0),
                    theta: 0.7,
                },
                &NoiseModel::ideal(),
                &mut rng,
            )
            .unwrap();
        let total: f64 = engine.probabilities().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
