//! GA configuration.
//!
//! [`GaConfig`] holds every parameter that controls the evolutionary loop.
//! All parameters are checked up front by [`GaConfig::validate`] — a bad
//! threshold fails at engine construction, never mid-run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration parameter outside its valid range.
///
/// Raised at engine construction, before any population exists.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// `chromosome_length` must be at least 1.
    #[error("chromosome_length must be at least 1")]
    ChromosomeLengthZero,

    /// No duplicate-free chromosome of this length exists.
    #[error("chromosome_length ({length}) exceeds catalog size ({catalog_size})")]
    ChromosomeLengthExceedsCatalog {
        /// Requested chromosome length.
        length: usize,
        /// Number of containers in the catalog.
        catalog_size: usize,
    },

    /// `selection_threshold` must lie in `(0.0, 1.0]`.
    #[error("selection_threshold must be in (0.0, 1.0], got {0}")]
    SelectionThresholdOutOfRange(f64),

    /// Selection would retain zero chromosomes.
    #[error("selection_threshold {threshold} retains no chromosomes out of {population_size}")]
    SelectionRetainsNothing {
        /// Configured selection threshold.
        threshold: f64,
        /// Configured population size.
        population_size: usize,
    },

    /// `solution_threshold` must be non-negative.
    #[error("solution_threshold must be non-negative, got {0}")]
    SolutionThresholdNegative(f64),

    /// `crossover_probability` must lie in `[0.0, 1.0]`.
    #[error("crossover_probability must be in [0.0, 1.0], got {0}")]
    CrossoverProbabilityOutOfRange(f64),

    /// `mutation_probability` must lie in `[0.0, 1.0]`.
    #[error("mutation_probability must be in [0.0, 1.0], got {0}")]
    MutationProbabilityOutOfRange(f64),

    /// `mutations_per_occurrence` must lie in `1..=population_size`.
    #[error("mutations_per_occurrence must be in 1..={population_size}, got {count}")]
    MutationsPerOccurrenceOutOfRange {
        /// Requested number of chromosomes mutated per occurrence.
        count: usize,
        /// Configured population size.
        population_size: usize,
    },

    /// `genes_per_mutation` must lie in `1..=chromosome_length`.
    #[error("genes_per_mutation must be in 1..={chromosome_length}, got {count}")]
    GenesPerMutationOutOfRange {
        /// Requested number of genes replaced per mutated chromosome.
        count: usize,
        /// Configured chromosome length.
        chromosome_length: usize,
    },

    /// `population_size` must be at least 2.
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),

    /// `max_iterations` must be at least 1.
    #[error("max_iterations must be at least 1")]
    MaxIterationsZero,

    /// The target profile names no labels.
    #[error("target profile has no labels")]
    EmptyTargetProfile,

    /// Penalty weights must cover exactly the target labels.
    #[error("penalty labels do not match target labels")]
    PenaltyLabelMismatch,

    /// Penalty weights must be non-negative.
    #[error("penalty weights must be non-negative")]
    NegativePenalty,
}

/// Configuration for the proportion-controlling GA.
///
/// # Defaults
///
/// ```
/// use proportion_ga::GaConfig;
///
/// let config = GaConfig::new(10);
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_iterations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use proportion_ga::GaConfig;
///
/// let config = GaConfig::new(10)
///     .with_selection_threshold(0.5)
///     .with_mutation_probability(0.2)
///     .with_random_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Number of containers selected per chromosome.
    ///
    /// Must not exceed the catalog size: a chromosome is duplicate-free,
    /// so the catalog must hold at least this many ids.
    pub chromosome_length: usize,

    /// Fraction of the population retained by selection, in `(0.0, 1.0]`.
    ///
    /// At exactly 1.0 selection is the identity.
    pub selection_threshold: f64,

    /// Fitness at or below which a chromosome is accepted as a solution.
    pub solution_threshold: f64,

    /// Probability of breeding one offspring per crossover step, in `[0.0, 1.0]`.
    ///
    /// With the complementary probability, two chromosomes are carried
    /// over unchanged instead.
    pub crossover_probability: f64,

    /// Probability that mutation fires at all in a generation, in `[0.0, 1.0]`.
    pub mutation_probability: f64,

    /// Number of chromosomes mutated when mutation fires.
    pub mutations_per_occurrence: usize,

    /// Number of genes replaced within each mutated chromosome.
    pub genes_per_mutation: usize,

    /// Nominal number of chromosomes per generation.
    pub population_size: usize,

    /// Maximum number of generations before the search stops.
    pub max_iterations: usize,

    /// Seed for the engine's private random stream.
    ///
    /// Runs with the same seed and inputs are bit-identical.
    pub random_seed: u64,
}

impl GaConfig {
    /// Creates a configuration with the given chromosome length and the
    /// default rates and sizes.
    pub fn new(chromosome_length: usize) -> Self {
        Self {
            chromosome_length,
            selection_threshold: 1.0,
            solution_threshold: 0.1,
            crossover_probability: 0.9,
            mutation_probability: 0.1,
            mutations_per_occurrence: 1,
            genes_per_mutation: 1,
            population_size: 100,
            max_iterations: 100,
            random_seed: 42,
        }
    }

    /// Sets the selection threshold.
    pub fn with_selection_threshold(mut self, threshold: f64) -> Self {
        self.selection_threshold = threshold;
        self
    }

    /// Sets the solution threshold.
    pub fn with_solution_threshold(mut self, threshold: f64) -> Self {
        self.solution_threshold = threshold;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability;
        self
    }

    /// Sets the number of chromosomes mutated per occurrence.
    pub fn with_mutations_per_occurrence(mut self, count: usize) -> Self {
        self.mutations_per_occurrence = count;
        self
    }

    /// Sets the number of genes replaced per mutated chromosome.
    pub fn with_genes_per_mutation(mut self, count: usize) -> Self {
        self.genes_per_mutation = count;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Checks every parameter against its valid range.
    ///
    /// The catalog-size cross-check lives in the engine constructor,
    /// which is the first place the catalog is in scope.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chromosome_length < 1 {
            return Err(ConfigError::ChromosomeLengthZero);
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.max_iterations < 1 {
            return Err(ConfigError::MaxIterationsZero);
        }
        if !(self.selection_threshold > 0.0 && self.selection_threshold <= 1.0) {
            return Err(ConfigError::SelectionThresholdOutOfRange(
                self.selection_threshold,
            ));
        }
        if (self.population_size as f64 * self.selection_threshold).floor() < 1.0 {
            return Err(ConfigError::SelectionRetainsNothing {
                threshold: self.selection_threshold,
                population_size: self.population_size,
            });
        }
        if self.solution_threshold < 0.0 || self.solution_threshold.is_nan() {
            return Err(ConfigError::SolutionThresholdNegative(
                self.solution_threshold,
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(ConfigError::CrossoverProbabilityOutOfRange(
                self.crossover_probability,
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ConfigError::MutationProbabilityOutOfRange(
                self.mutation_probability,
            ));
        }
        if self.mutations_per_occurrence < 1
            || self.mutations_per_occurrence > self.population_size
        {
            return Err(ConfigError::MutationsPerOccurrenceOutOfRange {
                count: self.mutations_per_occurrence,
                population_size: self.population_size,
            });
        }
        if self.genes_per_mutation < 1 || self.genes_per_mutation > self.chromosome_length {
            return Err(ConfigError::GenesPerMutationOutOfRange {
                count: self.genes_per_mutation,
                chromosome_length: self.chromosome_length,
            });
        }
        Ok(())
    }
}
