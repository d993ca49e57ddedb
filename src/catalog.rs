//! Container catalog.
//!
//! The catalog is the read-only pool the optimizer samples from: each
//! container id maps to its per-label counts (e.g., defect classes found
//! in the container). The engine never mutates the catalog, so one catalog
//! may be shared across independent searches.
//!
//! Ids keep their insertion order. The population generator slices the
//! ordered id list, so a hash-ordered catalog would make seeded runs
//! irreproducible.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use crate::counts;

/// Read-only mapping from container id to per-label counts.
///
/// Generic over the container-id type `C` and the label type `L`; integer
/// ids with string labels are typical, but any hashable key types work.
///
/// # Example
///
/// ```
/// use proportion_ga::Catalog;
/// use std::collections::HashMap;
///
/// let catalog: Catalog<u32, &str> = [
///     (1, HashMap::from([("Class1", 15.0), ("Class2", 10.0)])),
///     (2, HashMap::from([("Class1", 8.0), ("Class2", 20.0)])),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.ids(), &[1, 2]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    ids: Vec<C>,
    counts: HashMap<C, HashMap<L, f64>>,
}

impl<C, L> Catalog<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            counts: HashMap::new(),
        }
    }

    /// Inserts a container with its label counts.
    ///
    /// Re-inserting an existing id replaces its counts without changing
    /// the id's position in the ordered id list.
    pub fn insert(&mut self, id: C, label_counts: HashMap<L, f64>) {
        if self.counts.insert(id.clone(), label_counts).is_none() {
            self.ids.push(id);
        }
    }

    /// Number of containers in the catalog.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the catalog holds no containers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Container ids in insertion order.
    pub fn ids(&self) -> &[C] {
        &self.ids
    }

    /// Label counts for one container.
    pub fn get(&self, id: &C) -> Option<&HashMap<L, f64>> {
        self.counts.get(id)
    }

    /// Whether the catalog contains the given id.
    pub fn contains(&self, id: &C) -> bool {
        self.counts.contains_key(id)
    }

    /// Sums the label counts across the given containers.
    ///
    /// Ids missing from the catalog contribute nothing; chromosome genes
    /// are catalog keys by construction, so this only matters for
    /// hand-built input.
    pub fn counts_for(&self, ids: &[C]) -> HashMap<L, f64> {
        counts::merge_summing(ids.iter().filter_map(|id| self.counts.get(id)))
    }
}

impl<C, L> Default for Catalog<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, L> FromIterator<(C, HashMap<L, f64>)> for Catalog<C, L>
where
    C: Eq + Hash + Clone,
    L: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (C, HashMap<L, f64>)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (id, label_counts) in iter {
            catalog.insert(id, label_counts);
        }
        catalog
    }
}
