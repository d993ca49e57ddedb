//! Proportion-controlled subset selection via a genetic algorithm.
//!
//! Selects a fixed-size, duplicate-free subset of catalog containers so
//! that the subset's induced label proportions approximate a target
//! profile under per-label penalty weights. Typical use: drawing a
//! balanced inspection batch from a larger labeled pool.
//!
//! # Modules
//!
//! - **`catalog`**: the read-only container → label-count pool
//! - **`counts`**: pure count-map helpers (proportions, merging, difference)
//! - **`ga`**: the GA core — configuration, problem/fitness, chromosome
//!   representation, operators, and the generation loop
//!
//! # Example
//!
//! ```
//! use proportion_ga::{Catalog, GaConfig, GaEngine, ProportionProblem};
//! use std::collections::HashMap;
//!
//! let catalog: Catalog<u32, &str> = [
//!     (1, HashMap::from([("Class1", 15.0), ("Class2", 10.0)])),
//!     (2, HashMap::from([("Class1", 8.0), ("Class2", 20.0)])),
//!     (3, HashMap::from([("Class1", 30.0), ("Class2", 10.0)])),
//!     (4, HashMap::from([("Class1", 5.0), ("Class2", 5.0)])),
//! ]
//! .into_iter()
//! .collect();
//!
//! let problem = ProportionProblem::new(
//!     catalog,
//!     HashMap::from([("Class1", 0.4), ("Class2", 0.6)]),
//!     HashMap::from([("Class1", 1.0), ("Class2", 1.0)]),
//! )?;
//! let config = GaConfig::new(2)
//!     .with_population_size(10)
//!     .with_max_iterations(20);
//!
//! let mut engine = GaEngine::new(problem, config)?;
//! engine.solve()?;
//! assert!(engine.solution().is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Determinism
//!
//! Each engine owns a private random stream seeded from its
//! configuration. Runs with identical inputs and seeds are bit-identical;
//! independent searches use independent engines and may share the problem
//! read-only.

pub mod catalog;
pub mod counts;
pub mod ga;

pub use catalog::Catalog;
pub use ga::{
    BestSolution, Chromosome, ConfigError, EvolutionError, GaConfig, GaEngine, ProportionProblem,
};
