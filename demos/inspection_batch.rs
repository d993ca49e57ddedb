//! Selecting a balanced inspection batch.
//!
//! Picks 10 of 33 containers so that the combined defect-class counts
//! approximate a 40/30/30 split across the three classes.
//!
//! Run with `cargo run --example inspection_batch`.

use proportion_ga::{Catalog, GaConfig, GaEngine, ProportionProblem};
use std::collections::HashMap;

fn catalog() -> Catalog<u32, &'static str> {
    let rows: [(u32, [f64; 3]); 33] = [
        (1, [15.0, 10.0, 5.0]),
        (2, [8.0, 20.0, 12.0]),
        (3, [30.0, 10.0, 10.0]),
        (4, [5.0, 5.0, 30.0]),
        (5, [20.0, 15.0, 15.0]),
        (6, [10.0, 25.0, 5.0]),
        (7, [5.0, 5.0, 40.0]),
        (8, [15.0, 20.0, 5.0]),
        (9, [12.0, 8.0, 20.0]),
        (10, [8.0, 22.0, 10.0]),
        (11, [20.0, 10.0, 20.0]),
        (12, [15.0, 15.0, 20.0]),
        (13, [8.0, 12.0, 30.0]),
        (14, [10.0, 20.0, 10.0]),
        (15, [25.0, 15.0, 10.0]),
        (16, [5.0, 5.0, 30.0]),
        (17, [20.0, 10.0, 10.0]),
        (18, [15.0, 5.0, 20.0]),
        (19, [10.0, 25.0, 5.0]),
        (20, [8.0, 22.0, 10.0]),
        (21, [5.0, 5.0, 40.0]),
        (22, [15.0, 20.0, 5.0]),
        (23, [30.0, 10.0, 10.0]),
        (24, [20.0, 15.0, 15.0]),
        (25, [8.0, 20.0, 12.0]),
        (26, [10.0, 25.0, 5.0]),
        (27, [15.0, 10.0, 5.0]),
        (28, [8.0, 22.0, 10.0]),
        (29, [20.0, 10.0, 20.0]),
        (30, [15.0, 15.0, 20.0]),
        (31, [8.0, 12.0, 30.0]),
        (32, [10.0, 20.0, 10.0]),
        (33, [25.0, 15.0, 10.0]),
    ];

    rows.into_iter()
        .map(|(id, [class1, class2, class3])| {
            (
                id,
                HashMap::from([
                    ("Class1", class1),
                    ("Class2", class2),
                    ("Class3", class3),
                ]),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let problem = ProportionProblem::new(
        catalog(),
        HashMap::from([("Class1", 0.4), ("Class2", 0.3), ("Class3", 0.3)]),
        HashMap::from([("Class1", 1.0), ("Class2", 1.0), ("Class3", 1.0)]),
    )?;

    let config = GaConfig::new(10)
        .with_selection_threshold(1.0)
        .with_solution_threshold(0.1)
        .with_crossover_probability(0.9)
        .with_mutation_probability(0.1)
        .with_mutations_per_occurrence(1)
        .with_genes_per_mutation(1)
        .with_population_size(100)
        .with_max_iterations(100)
        .with_random_seed(42);

    let mut engine = GaEngine::new(problem, config)?;
    engine.solve()?;

    if let Some(best) = engine.solution() {
        println!("Selected containers: {:?}", best.chromosome.genes);
        println!("Fitness: {}", best.fitness);
        println!("Counts: {:?}", best.counts);
        println!("Proportions: {:?}", best.proportions);
    }

    Ok(())
}
