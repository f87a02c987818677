// src/optimize/mod.rs

//! Gradient-free minimization of the average fidelity metric.
//!
//! The objective is a black box: shot-sampled, non-smooth, and only cheap in
//! the aggregate. Both optimizers here are classic derivative-free methods,
//! a downhill simplex for small parameter vectors and SPSA for shot-noisy
//! objectives, driven through a common `Optimizer` trait so experiments can
//! swap them freely.

mod nelder_mead;
mod spsa;

pub use nelder_mead::NelderMead;
pub use spsa::Spsa;

use crate::ansatz::{parameter_count, random_parameters};
use crate::core::{QecError, Result};
use crate::fidelity::{FidelityRunner, MemoryExperiment};
use crate::simulation::derive_seed;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

/// Result of a minimization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    /// Best parameter vector found.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub cost: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Whether the optimizer's own convergence criterion was met before the
    /// iteration cap.
    pub converged: bool,
}

/// A gradient-free minimizer over a fallible objective. Errors from the
/// objective abort the run and propagate.
pub trait Optimizer {
    /// Minimizes `cost` starting from `initial`.
    fn minimize<F>(&self, cost: F, initial: &[f64]) -> Result<OptimizationOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>;
}

// Stream index for drawing initial parameters; the sample-state streams use
// small indices, so keep this far away.
const INITIAL_PARAMS_STREAM: u64 = u64::MAX;

/// Top-level driver: sizes the flat parameter vector for the experiment's
/// layout, splits it into the encoding half p and the recovery half q, and
/// minimizes the averaged fidelity metric.
///
/// `initial` must have the full length `parameter_count(layout, cycles)`;
/// when absent, a uniform random vector is drawn from the experiment seed.
///
/// # Errors
/// Fails on a zero cycle count, a mis-sized initial vector, or any
/// simulation/optimizer failure.
pub fn optimize_memory<R, O>(
    experiment: &MemoryExperiment,
    cycles: usize,
    runner: &R,
    optimizer: &O,
    initial: Option<Vec<f64>>,
) -> Result<OptimizationOutcome>
where
    R: FidelityRunner,
    O: Optimizer,
{
    if cycles == 0 {
        return Err(QecError::InvalidParameters {
            message: "optimization needs at least one ansatz cycle".to_string(),
        });
    }

    let total = parameter_count(experiment.layout(), cycles);
    let initial = match initial {
        Some(vector) => {
            if vector.len() != total {
                return Err(QecError::InvalidParameters {
                    message: format!(
                        "initial vector has {} parameters, layout {} with {} cycle(s) needs {}",
                        vector.len(),
                        experiment.layout(),
                        cycles,
                        total
                    ),
                });
            }
            vector
        }
        None => {
            let mut rng = StdRng::seed_from_u64(derive_seed(
                experiment.seed(),
                INITIAL_PARAMS_STREAM,
            ));
            random_parameters(total, &mut rng)
        }
    };

    info!(
        layout = %experiment.layout(),
        cycles,
        parameters = total,
        "optimization started"
    );

    let outcome = optimizer.minimize(
        |x| {
            let (p, q) = x.split_at(x.len() / 2);
            experiment.average_fidelity(p, q, runner)
        },
        &initial,
    )?;

    info!(
        cost = outcome.cost,
        iterations = outcome.iterations,
        evaluations = outcome.evaluations,
        converged = outcome.converged,
        "optimization finished"
    );
    Ok(outcome)
}
