// tests/optimizer_tests.rs

// Gradient-free minimizers and the end-to-end optimization driver.

use vqec::{
    CodeLayout, DummyRunner, IdealRunner, MemoryExperiment, NelderMead, Optimizer, QecError,
    Spsa, optimize_memory, parameter_count,
};

#[test]
fn nelder_mead_finds_a_quadratic_minimum() -> Result<(), QecError> {
    let optimizer = NelderMead {
        max_iterations: 400,
        tolerance: 1e-10,
        initial_step: 0.25,
    };
    let outcome = optimizer.minimize(
        |x| Ok((x[0] - 0.5).powi(2) + 2.0 * (x[1] - 0.25).powi(2) + 0.125),
        &[0.0, 1.0],
    )?;
    assert!(outcome.converged);
    assert!((outcome.params[0] - 0.5).abs() < 1e-3, "{:?}", outcome.params);
    assert!((outcome.params[1] - 0.25).abs() < 1e-3, "{:?}", outcome.params);
    assert!((outcome.cost - 0.125).abs() < 1e-5);
    Ok(())
}

#[test]
fn spsa_makes_progress_on_a_quadratic() -> Result<(), QecError> {
    let optimizer = Spsa {
        max_iterations: 200,
        a: 0.4,
        seed: 31,
        ..Spsa::default()
    };
    let objective = |x: &[f64]| -> Result<f64, QecError> {
        Ok(x.iter().map(|v| (v - 0.2) * (v - 0.2)).sum())
    };
    let start = [1.0, -1.0, 0.8, 0.0];
    let start_cost = objective(&start)?;
    let outcome = optimizer.minimize(objective, &start)?;
    assert!(
        outcome.cost < start_cost / 2.0,
        "SPSA should at least halve the cost: {} -> {}",
        start_cost,
        outcome.cost
    );
    Ok(())
}

#[test]
fn driver_sizes_and_splits_the_parameter_vector() -> Result<(), QecError> {
    // The dummy runner makes the objective constant, so Nelder-Mead
    // converges immediately; what this exercises is the plumbing: vector
    // sizing, the p/q split and outcome bookkeeping.
    let layout = CodeLayout::new(1, 2, 1)?;
    let experiment = MemoryExperiment::new(layout).with_samples(1);
    let optimizer = NelderMead {
        max_iterations: 20,
        tolerance: 1e-9,
        initial_step: 0.05,
    };

    let outcome = optimize_memory(&experiment, 1, &DummyRunner, &optimizer, None)?;
    assert_eq!(outcome.cost, 1.0);
    assert!(outcome.converged);
    assert_eq!(outcome.params.len(), parameter_count(&layout, 1));
    assert!(outcome.evaluations > 0);
    Ok(())
}

#[test]
fn driver_keeps_a_perfect_starting_point() -> Result<(), QecError> {
    // Starting at the identity ansatz under an ideal runner, the objective
    // is already at its global minimum of 0; the optimizer must not leave it.
    let layout = CodeLayout::new(1, 2, 0)?;
    let experiment = MemoryExperiment::new(layout).with_samples(2);
    let runner = IdealRunner::new().with_shots(64);
    let optimizer = NelderMead {
        max_iterations: 4,
        tolerance: 1e-12,
        initial_step: 0.1,
    };

    let total = parameter_count(&layout, 1);
    let outcome = optimize_memory(
        &experiment,
        1,
        &runner,
        &optimizer,
        Some(vec![0.0; total]),
    )?;
    assert!(
        outcome.cost < 1e-9,
        "optimum should not degrade from a perfect start, got {}",
        outcome.cost
    );
    Ok(())
}

#[test]
fn driver_rejects_mis_sized_initial_vectors() -> Result<(), QecError> {
    let layout = CodeLayout::new(1, 2, 0)?;
    let experiment = MemoryExperiment::new(layout).with_samples(1);
    let result = optimize_memory(
        &experiment,
        1,
        &DummyRunner,
        &NelderMead::default(),
        Some(vec![0.0; 3]),
    );
    assert!(matches!(result, Err(QecError::InvalidParameters { .. })));
    Ok(())
}

#[test]
fn driver_rejects_zero_cycles() -> Result<(), QecError> {
    let layout = CodeLayout::new(1, 2, 0)?;
    let experiment = MemoryExperiment::new(layout).with_samples(1);
    let result = optimize_memory(&experiment, 0, &DummyRunner, &NelderMead::default(), None);
    assert!(matches!(result, Err(QecError::InvalidParameters { .. })));
    Ok(())
}

#[test]
fn outcome_serializes_for_reporting() -> Result<(), QecError> {
    let optimizer = NelderMead {
        max_iterations: 50,
        tolerance: 1e-8,
        initial_step: 0.2,
    };
    let outcome = optimizer.minimize(|x| Ok(x[0] * x[0]), &[1.0])?;
    let json = serde_json::to_string(&outcome).expect("outcome serializes");
    assert!(json.contains("\"cost\""));
    assert!(json.contains("\"evaluations\""));
    Ok(())
}
