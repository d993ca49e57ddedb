//! Proportion-matching problem definition and fitness evaluation.
//!
//! Bridges the catalog to the GA engine: a chromosome's fitness is the
//! weighted L1 distance between the label proportions induced by its
//! containers and the target proportions. Lower is better; 0.0 means the
//! induced proportions match the target exactly on every target label.

use std::collections::HashMap;
use std::hash::Hash;

use crate::catalog::Catalog;
use crate::counts;
use crate::ga::chromosome::Chromosome;
use crate::ga::config::ConfigError;
use crate::ga::EvolutionError;

/// A proportion-matching problem: the catalog to sample from, the target
/// label fractions, and the per-label penalty weights.
///
/// Targets are not required to sum to 1 and are deliberately not
/// normalized. Penalties must cover exactly the target label set.
///
/// Read-only once constructed; one problem may be shared by several
/// engines searching with different seeds.
#[derive(Debug, Clone)]
pub struct ProportionProblem<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    catalog: Catalog<C, L>,
    targets: HashMap<L, f64>,
    penalties: HashMap<L, f64>,
}

impl<C, L> ProportionProblem<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    /// Creates a problem, validating the target and penalty maps.
    pub fn new(
        catalog: Catalog<C, L>,
        targets: HashMap<L, f64>,
        penalties: HashMap<L, f64>,
    ) -> Result<Self, ConfigError> {
        if targets.is_empty() {
            return Err(ConfigError::EmptyTargetProfile);
        }
        if penalties.len() != targets.len()
            || !targets.keys().all(|label| penalties.contains_key(label))
        {
            return Err(ConfigError::PenaltyLabelMismatch);
        }
        if penalties.values().any(|weight| *weight < 0.0) {
            return Err(ConfigError::NegativePenalty);
        }
        Ok(Self {
            catalog,
            targets,
            penalties,
        })
    }

    /// The container catalog.
    pub fn catalog(&self) -> &Catalog<C, L> {
        &self.catalog
    }

    /// Target fraction per label.
    pub fn targets(&self) -> &HashMap<L, f64> {
        &self.targets
    }

    /// Penalty weight per label.
    pub fn penalties(&self) -> &HashMap<L, f64> {
        &self.penalties
    }

    /// Sums the label counts across the chromosome's containers.
    ///
    /// Target labels absent from the selected containers are zero-filled
    /// so the distance term below always finds them.
    pub fn aggregate_counts(&self, chromosome: &Chromosome<C>) -> HashMap<L, f64> {
        let mut summed = self.catalog.counts_for(&chromosome.genes);
        for label in self.targets.keys() {
            summed.entry(label.clone()).or_insert(0.0);
        }
        summed
    }

    /// Label proportions induced by the chromosome's containers.
    ///
    /// Fails with [`EvolutionError::ZeroTotalCount`] when the aggregated
    /// counts sum to zero — proportions are undefined and continuing
    /// would poison the search.
    pub fn induced_proportions(
        &self,
        chromosome: &Chromosome<C>,
    ) -> Result<HashMap<L, f64>, EvolutionError> {
        counts::to_proportions(&self.aggregate_counts(chromosome))
            .ok_or(EvolutionError::ZeroTotalCount)
    }

    /// Scores one chromosome: sum over target labels of
    /// `penalty * |induced proportion - target|`.
    pub fn score(&self, chromosome: &Chromosome<C>) -> Result<f64, EvolutionError> {
        let proportions = self.induced_proportions(chromosome)?;
        let mut fitness = 0.0;
        for (label, target) in &self.targets {
            let induced = proportions.get(label).copied().unwrap_or(0.0);
            let penalty = self.penalties.get(label).copied().unwrap_or(0.0);
            fitness += (induced - target).abs() * penalty;
        }
        Ok(fitness)
    }

    /// Scores a whole population, element by element.
    pub fn score_population(
        &self,
        population: &[Chromosome<C>],
    ) -> Result<Vec<f64>, EvolutionError> {
        population
            .iter()
            .map(|chromosome| self.score(chromosome))
            .collect()
    }
}
