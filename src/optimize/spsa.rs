// src/optimize/spsa.rs

//! Simultaneous perturbation stochastic approximation (SPSA).

use super::{OptimizationOutcome, Optimizer};
use crate::core::{QecError, Result};
use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// SPSA minimizer.
///
/// Estimates a descent direction from exactly two objective evaluations per
/// iteration, regardless of dimension: the objective is probed at x ± c_k·Δ
/// for a random sign vector Δ. The two-sided difference quotient tolerates
/// shot noise well, which makes SPSA the usual choice for sampled
/// variational objectives. Gains follow the standard schedules
/// a_k = a/(k+1+A)^α and c_k = c/(k+1)^γ.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Iteration cap; there is no separate convergence criterion.
    pub max_iterations: usize,
    /// Step-size scale a.
    pub a: f64,
    /// Perturbation scale c.
    pub c: f64,
    /// Step-size decay exponent α.
    pub alpha: f64,
    /// Perturbation decay exponent γ.
    pub gamma: f64,
    /// Stability constant A added to the step-size denominator.
    pub stability: f64,
    /// Seed for the perturbation sign stream.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            a: 0.2,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            stability: 10.0,
            seed: 0,
        }
    }
}

impl Optimizer for Spsa {
    fn minimize<F>(&self, mut cost: F, initial: &[f64]) -> Result<OptimizationOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        if initial.is_empty() {
            return Err(QecError::Optimization {
                message: "cannot optimize an empty parameter vector".to_string(),
            });
        }

        let n = initial.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut x = initial.to_vec();

        let mut evaluations = 0usize;
        let mut eval = |point: &[f64], evaluations: &mut usize| -> Result<f64> {
            *evaluations += 1;
            let value = cost(point)?;
            if value.is_nan() {
                return Err(QecError::Optimization {
                    message: "objective returned NaN".to_string(),
                });
            }
            Ok(value)
        };

        let mut best_params = x.clone();
        let mut best_cost = eval(&x, &mut evaluations)?;

        let mut iterations = 0usize;
        for k in 0..self.max_iterations {
            iterations += 1;
            let ak = self.a / (k as f64 + 1.0 + self.stability).powf(self.alpha);
            let ck = self.c / (k as f64 + 1.0).powf(self.gamma);

            // Rademacher sign vector.
            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.random::<f64>() < 0.5 { -1.0 } else { 1.0 })
                .collect();

            let plus: Vec<f64> = x.iter().zip(delta.iter()).map(|(v, d)| v + ck * d).collect();
            let minus: Vec<f64> = x.iter().zip(delta.iter()).map(|(v, d)| v - ck * d).collect();

            let f_plus = eval(&plus, &mut evaluations)?;
            let f_minus = eval(&minus, &mut evaluations)?;

            if f_plus < best_cost {
                best_cost = f_plus;
                best_params = plus.clone();
            }
            if f_minus < best_cost {
                best_cost = f_minus;
                best_params = minus.clone();
            }

            let difference = (f_plus - f_minus) / (2.0 * ck);
            for (v, d) in x.iter_mut().zip(delta.iter()) {
                *v -= ak * difference / d;
            }

            debug!(iteration = iterations, best_cost, "spsa step");
        }

        // The final iterate may beat every probed point.
        let f_final = eval(&x, &mut evaluations)?;
        if f_final < best_cost {
            best_cost = f_final;
            best_params = x;
        }

        Ok(OptimizationOutcome {
            params: best_params,
            cost: best_cost,
            iterations,
            evaluations,
            converged: false,
        })
    }
}
