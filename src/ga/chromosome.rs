//! Chromosome representation and initial population generation.
//!
//! # Encoding
//!
//! A chromosome is an ordered, fixed-length, duplicate-free sequence of
//! container ids — one candidate subset of the catalog. The uniqueness
//! invariant is established here by slicing permutations and preserved by
//! every operator downstream.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::catalog::Catalog;

/// One candidate selection: a duplicate-free sequence of container ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome<C> {
    /// Container ids, one per gene position.
    pub genes: Vec<C>,
}

impl<C> Chromosome<C>
where
    C: Eq + Hash + Clone,
{
    /// Wraps a gene sequence.
    ///
    /// The caller is responsible for the uniqueness invariant; generated
    /// and bred chromosomes always satisfy it.
    pub fn from_genes(genes: Vec<C>) -> Self {
        Self { genes }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome holds no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether all genes are pairwise distinct.
    pub fn has_distinct_genes(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.genes.len());
        self.genes.iter().all(|gene| seen.insert(gene))
    }

    /// Whether this chromosome is a valid selection from the catalog:
    /// expected length, distinct genes, every gene a catalog key.
    pub fn is_valid<L>(&self, catalog: &Catalog<C, L>, expected_length: usize) -> bool
    where
        L: Eq + Hash + Clone,
    {
        self.genes.len() == expected_length
            && self.has_distinct_genes()
            && self.genes.iter().all(|gene| catalog.contains(gene))
    }
}

/// Builds the initial population from the ordered catalog ids.
///
/// Takes contiguous length-`chromosome_length` slices from a working copy
/// of the id list; when the remaining tail is too short, reshuffles the
/// copy and restarts the cursor. Each chromosome is a slice of a
/// permutation and therefore duplicate-free; the same id may appear in
/// different chromosomes.
///
/// Precondition (checked at engine construction): `chromosome_length`
/// does not exceed the catalog size.
pub fn generate_population<C, L, R>(
    catalog: &Catalog<C, L>,
    chromosome_length: usize,
    population_size: usize,
    rng: &mut R,
) -> Vec<Chromosome<C>>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
    R: Rng,
{
    let mut ids = catalog.ids().to_vec();
    let mut population = Vec::with_capacity(population_size);
    let mut cursor = 0;

    while population.len() < population_size {
        if cursor + chromosome_length > ids.len() {
            ids.shuffle(rng);
            cursor = 0;
        }
        population.push(Chromosome::from_genes(
            ids[cursor..cursor + chromosome_length].to_vec(),
        ));
        cursor += chromosome_length;
    }

    population
}
