// src/optimize/nelder_mead.rs

//! Downhill simplex minimization (Nelder-Mead).

use super::{OptimizationOutcome, Optimizer};
use crate::core::{QecError, Result};
use tracing::debug;

// Standard Nelder-Mead coefficients.
const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Nelder-Mead downhill simplex.
///
/// Maintains a simplex of n+1 points in parameter space and walks it
/// downhill through reflection, expansion, contraction and shrink steps.
/// Convergence is declared when the cost spread across the simplex drops
/// below `tolerance`.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Cost-spread convergence threshold.
    pub tolerance: f64,
    /// Offset used to seed the initial simplex around the start point.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            initial_step: 0.1,
        }
    }
}

impl Optimizer for NelderMead {
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

        // Initial simplex: the start point plus one step along each axis.
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let f0 = eval(initial, &mut evaluations)?;
        simplex.push((initial.to_vec(), f0));
        for axis in 0..n {
            let mut vertex = initial.to_vec();
            vertex[axis] += self.initial_step;
            let value = eval(&vertex, &mut evaluations)?;
            simplex.push((vertex, value));
        }

        let mut iterations = 0usize;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best_cost = simplex[0].1;
            let worst_cost = simplex[n].1;
            if (worst_cost - best_cost).abs() < self.tolerance {
                converged = true;
                break;
            }

            // Centroid of all vertices except the worst.
            let mut centroid = vec![0.0; n];
            for (vertex, _) in simplex.iter().take(n) {
                for (c, v) in centroid.iter_mut().zip(vertex.iter()) {
                    *c += v;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            let worst = simplex[n].0.clone();
            let reflected: Vec<f64> = centroid
                .iter()
                .zip(worst.iter())
                .map(|(c, w)| c + REFLECTION * (c - w))
                .collect();
            let f_reflected = eval(&reflected, &mut evaluations)?;

            if f_reflected < simplex[0].1 {
                // Try to go further in the same direction.
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(reflected.iter())
                    .map(|(c, r)| c + EXPANSION * (r - c))
                    .collect();
                let f_expanded = eval(&expanded, &mut evaluations)?;
                simplex[n] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
            } else if f_reflected < simplex[n - 1].1 {
                simplex[n] = (reflected, f_reflected);
            } else {
                // Contract toward the better of worst/reflected.
                let (anchor, f_anchor) = if f_reflected < simplex[n].1 {
                    (&reflected, f_reflected)
                } else {
                    (&worst, simplex[n].1)
                };
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(anchor.iter())
                    .map(|(c, a)| c + CONTRACTION * (a - c))
                    .collect();
                let f_contracted = eval(&contracted, &mut evaluations)?;

                if f_contracted < f_anchor {
                    simplex[n] = (contracted, f_contracted);
                } else {
                    // Shrink everything toward the best vertex.
                    let best = simplex[0].0.clone();
                    for (vertex, value) in simplex.iter_mut().skip(1) {
                        for (v, b) in vertex.iter_mut().zip(best.iter()) {
                            *v = b + SHRINK * (*v - b);
                        }
                        *value = eval(vertex, &mut evaluations)?;
                    }
                }
            }

            debug!(
                iteration = iterations,
                best_cost = simplex
                    .iter()
                    .map(|(_, v)| *v)
                    .fold(f64::INFINITY, f64::min),
                "simplex step"
            );
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (params, cost_value) = simplex.swap_remove(0);
        Ok(OptimizationOutcome {
            params,
            cost: cost_value,
            iterations,
            evaluations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_shifted_sphere() {
        let optimizer = NelderMead {
            max_iterations: 500,
            tolerance: 1e-10,
            initial_step: 0.5,
        };
        let outcome = optimizer
            .minimize(
                |x| Ok((x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)),
                &[0.0, 0.0],
            )
            .unwrap();
        assert!(outcome.converged, "expected convergence, got {:?}", outcome);
        assert!((outcome.params[0] - 1.0).abs() < 1e-3);
        assert!((outcome.params[1] + 2.0).abs() < 1e-3);
        assert!(outcome.cost < 1e-6);
    }

    #[test]
    fn respects_iteration_cap() {
        let optimizer = NelderMead {
            max_iterations: 3,
            tolerance: 0.0,
            initial_step: 0.1,
        };
        let outcome = optimizer
            .minimize(|x| Ok(x.iter().map(|v| v * v).sum()), &[5.0, 5.0, 5.0])
            .unwrap();
        assert_eq!(outcome.iterations, 3);
        assert!(!outcome.converged);
    }

    #[test]
    fn propagates_objective_errors() {
        let optimizer = NelderMead::default();
        let result = optimizer.minimize(
            |_| {
                Err(QecError::Simulation {
                    message: "boom".to_string(),
                })
            },
            &[1.0],
        );
        assert!(matches!(result, Err(QecError::Simulation { .. })));
    }

    #[test]
    fn rejects_empty_start() {
        let optimizer = NelderMead::default();
        assert!(matches!(
            optimizer.minimize(|_| Ok(0.0), &[]),
            Err(QecError::Optimization { .. })
        ));
    }
}
