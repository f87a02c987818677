// src/core/constants.rs

//! Experiment defaults shared across the crate.

/// Default number of measurement shots per circuit execution.
pub const DEFAULT_SHOTS: usize = 1024;

/// Default damping parameter for the amplitude-damping memory channel.
pub const DEFAULT_DAMPING: f64 = 0.1;

/// Default number of sampled logical states averaged per fidelity estimate.
pub const DEFAULT_FIDELITY_SAMPLES: usize = 10;

/// Default number of noise/recovery rounds inside the memory circuit.
pub const DEFAULT_RECOVERY_ROUNDS: usize = 1;

/// Default PRNG seed. Runs are reproducible for a fixed seed; vary it for
/// independent noise realizations.
pub const DEFAULT_SEED: u64 = 0x5eed_c0de;

/// Full turn in radians; variational parameters are scaled by this before
/// they become rotation angles.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
