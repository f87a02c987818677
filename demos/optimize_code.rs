//! Optimizes encoding and recovery parameters for a small noisy memory and
//! prints the outcome as a JSON report.

use vqec::{
    CodeLayout, MemoryExperiment, NoisyRunner, QecError, Spsa, optimize_memory,
};

fn main() -> Result<(), QecError> {
    let layout = CodeLayout::new(1, 3, 1)?;
    let experiment = MemoryExperiment::new(layout).with_samples(4);
    let runner = NoisyRunner::default_damping().with_shots(256);

    // SPSA: two objective evaluations per iteration, robust to shot noise.
    let optimizer = Spsa {
        max_iterations: 30,
        seed: 7,
        ..Spsa::default()
    };

    println!("Optimizing {} under amplitude damping...", layout);
    let outcome = optimize_memory(&experiment, 1, &runner, &optimizer, None)?;

    println!(
        "Best fidelity metric {:.4} after {} iterations / {} evaluations",
        outcome.cost, outcome.iterations, outcome.evaluations
    );
    println!(
        "Report: {}",
        serde_json::to_string_pretty(&outcome).expect("outcome serializes")
    );
    Ok(())
}
