//! Estimates the average fidelity of the 5-qubit memory with three refresh
//! ancillas under per-qubit amplitude damping, at a random working point.

use rand::SeedableRng;
use rand::rngs::StdRng;
use vqec::{
    CodeLayout, MemoryExperiment, NoisyRunner, QecError, parameter_count, random_parameters,
};

fn main() -> Result<(), QecError> {
    // k logical, n physical (logical + syndrome), r refresh.
    let layout = CodeLayout::new(1, 5, 3)?;
    let experiment = MemoryExperiment::new(layout);
    let runner = NoisyRunner::default_damping();

    println!("Layout: {}", layout);
    println!(
        "Experiment config: {}",
        serde_json::to_string(&layout).expect("layout serializes")
    );

    // One flat vector; the first half parametrizes encoding, the second
    // half recovery.
    let total = parameter_count(&layout, 1);
    let mut rng = StdRng::seed_from_u64(2024);
    let params = random_parameters(total, &mut rng);
    let (p, q) = params.split_at(total / 2);

    println!(
        "Estimating average fidelity over {} sampled logical states...",
        experiment.samples()
    );
    let average = experiment.average_fidelity(p, q, &runner)?;

    println!("Average fidelity metric (lower is better): {:.4}", average);
    println!(
        "Survival fraction of the all-zero outcome:   {:.4}",
        1.0 - average
    );
    Ok(())
}
