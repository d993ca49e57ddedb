//! Pure helpers for label-count maps.
//!
//! The fitness evaluator is composed from these small building blocks:
//! converting a count map to proportions, merging count maps by summing,
//! and order-preserving list difference. All functions are pure and take
//! no part in the evolutionary state.

use std::collections::HashMap;
use std::hash::Hash;

/// Converts a count map to a proportion map.
///
/// Each value is divided by the sum of all values, so the output fractions
/// sum to 1.0 (up to floating-point rounding). Returns `None` when the
/// total is not positive — proportions are undefined for an all-zero map.
pub fn to_proportions<L>(counts: &HashMap<L, f64>) -> Option<HashMap<L, f64>>
where
    L: Eq + Hash + Clone,
{
    let total: f64 = counts.values().sum();
    if total <= 0.0 {
        return None;
    }
    Some(
        counts
            .iter()
            .map(|(label, count)| (label.clone(), count / total))
            .collect(),
    )
}

/// Merges count maps by summing the values under equal keys.
///
/// Keys missing from a map contribute nothing for that map.
pub fn merge_summing<'a, L, I>(maps: I) -> HashMap<L, f64>
where
    L: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a HashMap<L, f64>>,
{
    let mut merged = HashMap::new();
    for map in maps {
        for (label, count) in map {
            *merged.entry(label.clone()).or_insert(0.0) += count;
        }
    }
    merged
}

/// Returns the elements of `pool` that do not occur in `exclude`,
/// preserving `pool`'s order.
///
/// Order preservation matters: callers draw from the result with a seeded
/// RNG, and a set-based difference would make runs irreproducible.
pub fn difference<T>(pool: &[T], exclude: &[T]) -> Vec<T>
where
    T: PartialEq + Clone,
{
    pool.iter()
        .filter(|item| !exclude.contains(item))
        .cloned()
        .collect()
}
