// src/noise/mod.rs

//! Single-qubit noise channels and the simulator-side noise model.
//!
//! Channels are described by their Kraus decompositions and applied by the
//! engine via Monte-Carlo trajectory sampling: at each noise site, one Kraus
//! operator is drawn per qubit with probability ‖K|ψ⟩‖² and the state is
//! renormalized. A `NoiseModel` tells the simulator which channel (if any)
//! fires at `Gate::Noise` sites; refresh qubits are simply never listed as
//! noise targets.

use crate::core::Result;
use crate::validation::check_probability;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2×2 Kraus operator in row-major order.
pub type KrausMatrix = [[Complex<f64>; 2]; 2];

/// A single-qubit noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NoiseChannel {
    /// Amplitude damping: energy relaxation (T1 decay) with damping
    /// parameter γ.
    /// Kraus: K0 = [[1, 0], [0, √(1−γ)]], K1 = [[0, √γ], [0, 0]].
    AmplitudeDamping {
        /// Damping parameter γ ∈ [0, 1].
        gamma: f64,
    },

    /// Depolarizing channel: with probability p, a uniformly random Pauli.
    /// Kraus: {√(1−p)·I, √(p/3)·X, √(p/3)·Y, √(p/3)·Z}.
    Depolarizing {
        /// Error probability p ∈ [0, 1].
        p: f64,
    },

    /// Dephasing (phase-flip) channel: with probability p, applies Z.
    /// Kraus: {√(1−p)·I, √p·Z}.
    Dephasing {
        /// Flip probability p ∈ [0, 1].
        p: f64,
    },
}

impl NoiseChannel {
    /// Amplitude-damping channel with validated γ.
    pub fn amplitude_damping(gamma: f64) -> Result<Self> {
        check_probability(gamma, "damping parameter gamma")?;
        Ok(NoiseChannel::AmplitudeDamping { gamma })
    }

    /// Depolarizing channel with validated p.
    pub fn depolarizing(p: f64) -> Result<Self> {
        check_probability(p, "depolarizing probability")?;
        Ok(NoiseChannel::Depolarizing { p })
    }

    /// Dephasing channel with validated p.
    pub fn dephasing(p: f64) -> Result<Self> {
        check_probability(p, "dephasing probability")?;
        Ok(NoiseChannel::Dephasing { p })
    }

    /// Re-checks the channel parameter, for values that arrived through
    /// deserialization rather than a constructor.
    pub fn validate(&self) -> Result<()> {
        match *self {
            NoiseChannel::AmplitudeDamping { gamma } => {
                check_probability(gamma, "damping parameter gamma")
            }
            NoiseChannel::Depolarizing { p } => check_probability(p, "depolarizing probability"),
            NoiseChannel::Dephasing { p } => check_probability(p, "dephasing probability"),
        }
    }

    /// The primary error parameter of the channel.
    pub fn error_param(&self) -> f64 {
        match *self {
            NoiseChannel::AmplitudeDamping { gamma } => gamma,
            NoiseChannel::Depolarizing { p } => p,
            NoiseChannel::Dephasing { p } => p,
        }
    }

    /// The Kraus operators of this channel. Satisfies Σ K†K = I.
    pub fn kraus_operators(&self) -> Vec<KrausMatrix> {
        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        let i = Complex::new(0.0, 1.0);

        match *self {
            NoiseChannel::AmplitudeDamping { gamma } => {
                let sqrt_1mg = Complex::new((1.0 - gamma).sqrt(), 0.0);
                let sqrt_g = Complex::new(gamma.sqrt(), 0.0);
                vec![
                    // K0 = [[1, 0], [0, √(1-γ)]]
                    [[one, zero], [zero, sqrt_1mg]],
                    // K1 = [[0, √γ], [0, 0]]
                    [[zero, sqrt_g], [zero, zero]],
                ]
            }
            NoiseChannel::Depolarizing { p } => {
                let sqrt_id = Complex::new((1.0 - p).sqrt(), 0.0);
                let sqrt_p3 = Complex::new((p / 3.0).sqrt(), 0.0);
                vec![
                    // √(1-p) · I
                    [[sqrt_id, zero], [zero, sqrt_id]],
                    // √(p/3) · X
                    [[zero, sqrt_p3], [sqrt_p3, zero]],
                    // √(p/3) · Y
                    [[zero, -i * sqrt_p3], [i * sqrt_p3, zero]],
                    // √(p/3) · Z
                    [[sqrt_p3, zero], [zero, -sqrt_p3]],
                ]
            }
            NoiseChannel::Dephasing { p } => {
                let sqrt_id = Complex::new((1.0 - p).sqrt(), 0.0);
                let sqrt_p = Complex::new(p.sqrt(), 0.0);
                vec![
                    // √(1-p) · I
                    [[sqrt_id, zero], [zero, sqrt_id]],
                    // √p · Z
                    [[sqrt_p, zero], [zero, -sqrt_p]],
                ]
            }
        }
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseChannel::AmplitudeDamping { gamma } => {
                write!(f, "amplitude_damping(γ={:.4})", gamma)
            }
            NoiseChannel::Depolarizing { p } => write!(f, "depolarizing(p={:.4})", p),
            NoiseChannel::Dephasing { p } => write!(f, "dephasing(p={:.4})", p),
        }
    }
}

/// The simulator-side noise description: either ideal, or a channel applied
/// independently to every qubit listed in a `Gate::Noise` site. The n-fold
/// per-qubit application reproduces the tensor-product error of the original
/// memory model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseModel {
    channel: Option<NoiseChannel>,
}

impl NoiseModel {
    /// A model with no noise: `Gate::Noise` sites become identities.
    pub fn ideal() -> Self {
        Self { channel: None }
    }

    /// A model firing `channel` at every noise site.
    pub fn with_channel(channel: NoiseChannel) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// The configured channel, if any.
    pub fn channel(&self) -> Option<&NoiseChannel> {
        self.channel.as_ref()
    }

    /// `true` when no channel is configured.
    pub fn is_ideal(&self) -> bool {
        self.channel.is_none()
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.channel {
            Some(channel) => write!(f, "NoiseModel({})", channel),
            None => write!(f, "NoiseModel(ideal)"),
        }
    }
}
