//! Genetic-algorithm core for proportion-controlled subset selection.
//!
//! # Encoding
//!
//! A chromosome is a fixed-length, duplicate-free sequence of container
//! ids — one candidate subset of the catalog. Fitness is the weighted L1
//! distance between the subset's induced label proportions and the target
//! profile (lower is better, 0.0 is an exact match).
//!
//! # Submodules
//!
//! - [`config`]: loop parameters, validated up front
//! - [`problem`]: catalog + target profile + fitness evaluation
//! - [`chromosome`]: representation and initial population generation
//! - [`operators`]: selection, uniqueness-preserving crossover and mutation
//! - [`engine`]: the generation loop and best-solution tracking

pub mod chromosome;
pub mod config;
pub mod engine;
pub mod operators;
pub mod problem;

pub use chromosome::{generate_population, Chromosome};
pub use config::{ConfigError, GaConfig};
pub use engine::{BestSolution, GaEngine};
pub use problem::ProportionProblem;

use thiserror::Error;

/// An unrecoverable condition detected while the search is running.
///
/// All variants are precondition violations: the engine fails fast rather
/// than keep iterating on a population whose invariants may no longer
/// hold. Exhausting the iteration budget is not an error.
#[derive(Debug, Error, PartialEq)]
pub enum EvolutionError {
    /// A chromosome's aggregated label counts sum to zero, so its
    /// proportions are undefined.
    #[error("aggregated label counts sum to zero; proportions are undefined")]
    ZeroTotalCount,

    /// A replacement gene was needed but every catalog id is already in
    /// the chromosome (`chromosome_length == catalog size` starves
    /// mutation).
    #[error("no catalog ids left to draw a replacement gene from")]
    NoAvailableIds,

    /// An operator needed parents but the population is empty.
    #[error("cannot draw parents from an empty population")]
    EmptyPopulation,
}
