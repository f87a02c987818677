// src/simulation/engine.rs

use crate::core::{QecError, QubitId, Result, StateVector};
use crate::noise::{KrausMatrix, NoiseModel};
use crate::operations::Gate;
use num_complex::Complex;
use num_traits::Zero;
use rand::RngExt;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

/// The statevector engine behind `Simulator`. Holds the dense state of one
/// trajectory and applies gates, Kraus channels and terminal measurement.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Maps qubit ids to their index (0..N-1) in the sorted register order
    /// used for the global state vector.
    qubit_indices: HashMap<QubitId, usize>,
    /// The global state vector over 2^N basis states.
    state: StateVector,
    /// Number of simulated qubits (N).
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine for a set of qubits in the |0...0⟩ state.
    /// Index assignment sorts the ids so it is deterministic regardless of
    /// set iteration order.
    pub(crate) fn init(qubit_ids: &HashSet<QubitId>) -> Result<Self> {
        if qubit_ids.is_empty() {
            return Err(QecError::InvalidOperation {
                message: "cannot initialize the engine with zero qubits".to_string(),
            });
        }

        let num_qubits = qubit_ids.len();
        let dim = 1usize
            .checked_shl(num_qubits as u32)
            .ok_or_else(|| QecError::Numerical {
                message: format!(
                    "{} qubits: state vector dimension overflows usize",
                    num_qubits
                ),
            })?;

        let mut sorted_ids: Vec<QubitId> = qubit_ids.iter().cloned().collect();
        sorted_ids.sort();
        let mut qubit_indices = HashMap::with_capacity(num_qubits);
        for (index, qubit_id) in sorted_ids.into_iter().enumerate() {
            qubit_indices.insert(qubit_id, index);
        }

        let mut initial = vec![Complex::zero(); dim];
        initial[0] = Complex::new(1.0, 0.0);

        Ok(Self {
            qubit_indices,
            state: StateVector::new(initial),
            num_qubits,
        })
    }

    /// Read access to the current state.
    pub(crate) fn state(&self) -> &StateVector {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.state.dim() {
            return Err(QecError::Simulation {
                message: format!(
                    "cannot set state: dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            });
        }
        self.state = state;
        Ok(())
    }

    /// Applies one gate to the state. Noise sites consult `noise`; all other
    /// gates are deterministic. `rng` drives Kraus sampling only.
    pub(crate) fn apply_gate(
        &mut self,
        gate: &Gate,
        noise: &NoiseModel,
        rng: &mut StdRng,
    ) -> Result<()> {
        match gate {
            Gate::Rz { target, theta } => {
                let target_idx = self.qubit_index(target)?;
                self.apply_single_qubit(target_idx, &rz_matrix(*theta))
            }
            Gate::Rx { target, theta } => {
                let target_idx = self.qubit_index(target)?;
                self.apply_single_qubit(target_idx, &rx_matrix(*theta))
            }
            Gate::ControlledRz {
                control,
                target,
                theta,
            } => {
                let control_idx = self.qubit_index(control)?;
                let target_idx = self.qubit_index(target)?;
                if control_idx == target_idx {
                    return Err(QecError::InvalidOperation {
                        message: "controlled rotation needs distinct control and target"
                            .to_string(),
                    });
                }
                // Basis |control, target⟩; Rz acts in the control=1 block.
                let rz = rz_matrix(*theta);
                let one = Complex::new(1.0, 0.0);
                let matrix = vec![
                    vec![one, Complex::zero(), Complex::zero(), Complex::zero()],
                    vec![Complex::zero(), one, Complex::zero(), Complex::zero()],
                    vec![Complex::zero(), Complex::zero(), rz[0][0], rz[0][1]],
                    vec![Complex::zero(), Complex::zero(), rz[1][0], rz[1][1]],
                ];
                self.apply_unitary(&[control_idx, target_idx], &matrix)
            }
            Gate::Unitary {
                targets, matrix, ..
            } => {
                let indices = targets
                    .iter()
                    .map(|q| self.qubit_index(q))
                    .collect::<Result<Vec<_>>>()?;
                self.apply_unitary(&indices, matrix)
            }
            Gate::Noise { targets } => {
                let Some(channel) = noise.channel() else {
                    return Ok(()); // ideal model: the site is an identity
                };
                let kraus = channel.kraus_operators();
                for qubit in targets {
                    let target_idx = self.qubit_index(qubit)?;
                    self.apply_kraus(target_idx, &kraus, rng)?;
                }
                Ok(())
            }
        }
    }

    /// Samples one computational-basis outcome from |amplitude|^2.
    /// The state is left untouched; measurement is terminal in this crate.
    pub(crate) fn measure(&self, rng: &mut StdRng) -> Result<u64> {
        let amplitudes = self.state.amplitudes();
        let total: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum();
        if total <= f64::MIN_POSITIVE {
            return Err(QecError::Numerical {
                message: "state norm vanished before measurement".to_string(),
            });
        }

        let sample: f64 = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for (index, amplitude) in amplitudes.iter().enumerate() {
            cumulative += amplitude.norm_sqr();
            if sample < cumulative {
                return Ok(index as u64);
            }
        }
        // Floating-point tail: land on the last basis state.
        Ok((amplitudes.len() - 1) as u64)
    }

    /// Outcome probabilities for every basis state, normalized.
    pub(crate) fn probabilities(&self) -> Vec<f64> {
        let amplitudes = self.state.amplitudes();
        let total: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum();
        if total <= f64::MIN_POSITIVE {
            return vec![0.0; amplitudes.len()];
        }
        amplitudes.iter().map(|a| a.norm_sqr() / total).collect()
    }

    fn qubit_index(&self, qubit_id: &QubitId) -> Result<usize> {
        self.qubit_indices
            .get(qubit_id)
            .copied()
            .ok_or_else(|| QecError::Simulation {
                message: format!("qubit {} not found in simulation context", qubit_id),
            })
    }

    /// Applies a 2x2 matrix to one qubit by iterating over basis-state pairs
    /// that differ only in the target bit.
    fn apply_single_qubit(&mut self, target_idx: usize, matrix: &KrausMatrix) -> Result<()> {
        let dim = self.state.dim();
        let mut new_vec = vec![Complex::zero(); dim];
        apply_single_qubit_into(
            self.state.amplitudes(),
            &mut new_vec,
            self.num_qubits,
            target_idx,
            matrix,
        );
        self.state = StateVector::new(new_vec);
        Ok(())
    }

    /// Applies a dense 2^m x 2^m matrix to the m qubits at `indices`.
    /// `indices[0]` carries the most significant bit of the matrix's basis
    /// ordering. Gathers each 2^m-dimensional subspace, multiplies, scatters
    /// back.
    fn apply_unitary(&mut self, indices: &[usize], matrix: &[Vec<Complex<f64>>]) -> Result<()> {
        let m = indices.len();
        let sub_dim = 1usize << m;
        if matrix.len() != sub_dim || matrix.iter().any(|row| row.len() != sub_dim) {
            return Err(QecError::Simulation {
                message: format!(
                    "matrix shape does not match {} target qubit(s): expected {}x{}",
                    m, sub_dim, sub_dim
                ),
            });
        }

        // Bit position of each target in a basis index, MSB-first targets.
        let bit_positions: Vec<usize> = indices
            .iter()
            .map(|idx| self.num_qubits - 1 - idx)
            .collect();
        let target_mask: usize = bit_positions.iter().map(|b| 1usize << b).sum();

        let dim = self.state.dim();
        let amplitudes = self.state.amplitudes();
        let mut new_vec = amplitudes.to_vec();

        for base in 0..dim {
            if base & target_mask != 0 {
                continue; // not a subspace anchor
            }

            let mut subspace_indices = vec![0usize; sub_dim];
            for (s, slot) in subspace_indices.iter_mut().enumerate() {
                let mut index = base;
                for (j, bit) in bit_positions.iter().enumerate() {
                    if s & (1 << (m - 1 - j)) != 0 {
                        index |= 1 << bit;
                    }
                }
                *slot = index;
            }

            for (row, out_row) in matrix.iter().enumerate() {
                let mut acc = Complex::zero();
                for (col, entry) in out_row.iter().enumerate() {
                    acc += entry * amplitudes[subspace_indices[col]];
                }
                new_vec[subspace_indices[row]] = acc;
            }
        }

        self.state = StateVector::new(new_vec);
        Ok(())
    }

    /// Trajectory step for one qubit of a noise site: weights each Kraus
    /// candidate by ‖K|ψ⟩‖², samples one and renormalizes. The weights sum
    /// to the state norm by channel completeness.
    fn apply_kraus(
        &mut self,
        target_idx: usize,
        kraus: &[KrausMatrix],
        rng: &mut StdRng,
    ) -> Result<()> {
        let dim = self.state.dim();
        let amplitudes = self.state.amplitudes();

        let mut candidates: Vec<(f64, Vec<Complex<f64>>)> = Vec::with_capacity(kraus.len());
        let mut total_weight = 0.0;
        for operator in kraus {
            let mut candidate = vec![Complex::zero(); dim];
            apply_single_qubit_into(
                amplitudes,
                &mut candidate,
                self.num_qubits,
                target_idx,
                operator,
            );
            let weight: f64 = candidate.iter().map(|a| a.norm_sqr()).sum();
            total_weight += weight;
            candidates.push((weight, candidate));
        }

        if total_weight <= f64::MIN_POSITIVE {
            return Err(QecError::Numerical {
                message: "state norm vanished while sampling a noise channel".to_string(),
            });
        }

        let sample: f64 = rng.random::<f64>() * total_weight;
        let mut cumulative = 0.0;
        let mut chosen = candidates.len() - 1;
        for (k, (weight, _)) in candidates.iter().enumerate() {
            cumulative += weight;
            if sample < cumulative {
                chosen = k;
                break;
            }
        }
        // A zero-weight branch can be hit only through the floating-point
        // tail; fall back to the heaviest candidate.
        if candidates[chosen].0 <= f64::MIN_POSITIVE {
            chosen = candidates
                .iter()
                .enumerate()
                .max_by(|(_, (weight_a, _)), (_, (weight_b, _))| weight_a.total_cmp(weight_b))
                .map(|(k, _)| k)
                .unwrap_or(chosen);
        }

        let (weight, mut state) = candidates.swap_remove(chosen);
        let scale = weight.sqrt().recip();
        for amplitude in &mut state {
            *amplitude *= scale;
        }
        self.state = StateVector::new(state);
        Ok(())
    }
}

/// Core single-qubit kernel shared by gate and Kraus application. Writes
/// `matrix * |in⟩` into `out`; the matrix need not be unitary.
fn apply_single_qubit_into(
    input: &[Complex<f64>],
    out: &mut [Complex<f64>],
    num_qubits: usize,
    target_idx: usize,
    matrix: &KrausMatrix,
) {
    let k = num_qubits - 1 - target_idx; // bit position, from the right
    let k_mask = 1usize << k;
    let low_mask = k_mask - 1;
    let dim = input.len();

    for compressed in 0..dim / 2 {
        // Re-insert a zero at bit k to address the |..0..⟩ component.
        let i0 = ((compressed & !low_mask) << 1) | (compressed & low_mask);
        let i1 = i0 | k_mask;

        let psi0 = input[i0];
        let psi1 = input[i1];
        out[i0] = matrix[0][0] * psi0 + matrix[0][1] * psi1;
        out[i1] = matrix[1][0] * psi0 + matrix[1][1] * psi1;
    }
}

/// Rz(θ) = diag(e^{-iθ/2}, e^{iθ/2}).
fn rz_matrix(theta: f64) -> KrausMatrix {
    let half = theta / 2.0;
    [
        [Complex::new(half.cos(), -half.sin()), Complex::zero()],
        [Complex::zero(), Complex::new(half.cos(), half.sin())],
    ]
}

/// Rx(θ) = [[cos(θ/2), -i·sin(θ/2)], [-i·sin(θ/2), cos(θ/2)]].
fn rx_matrix(theta: f64) -> KrausMatrix {
    let half = theta / 2.0;
    let cos = Complex::new(half.cos(), 0.0);
    let msin = Complex::new(0.0, -half.sin());
    [[cos, msin], [msin, cos]]
}
