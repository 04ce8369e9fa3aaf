//! Set comparisons over fetched ID collections.

use std::collections::HashSet;
use std::hash::Hash;

use indexmap::IndexMap;

use super::pair::PairKey;
use crate::error::{Error, Result};

/// Elements common to every set.
///
/// A single set is returned unchanged; an empty intersection is a valid
/// result. At least one set is required.
pub fn intersection<T, I>(sets: I) -> Result<HashSet<T>>
where
    T: Eq + Hash,
    I: IntoIterator<Item = HashSet<T>>,
{
    let mut sets = sets.into_iter();
    let mut common = sets
        .next()
        .ok_or_else(|| Error::validation("intersection requires at least one set"))?;
    for other in sets {
        common.retain(|item| other.contains(item));
    }
    Ok(common)
}

/// For every label, the elements no other label's set contains.
///
/// Label order of the input is kept. A single label maps to its own set.
pub fn difference<K, T>(labeled: &IndexMap<K, HashSet<T>>) -> Result<IndexMap<K, HashSet<T>>>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    if labeled.is_empty() {
        return Err(Error::validation("difference requires at least one labeled set"));
    }
    let distinct = labeled
        .iter()
        .map(|(key, values)| {
            let mut unique = values.clone();
            for (other_key, other_values) in labeled {
                if other_key != key {
                    unique.retain(|item| !other_values.contains(item));
                }
            }
            (key.clone(), unique)
        })
        .collect();
    Ok(distinct)
}

/// Size of the pairwise intersection for every unordered pair, largest
/// overlap first. Ties keep enumeration order.
pub fn overlap_ranking<T>(labeled: &IndexMap<String, HashSet<T>>) -> Result<Vec<(PairKey, usize)>>
where
    T: Eq + Hash,
{
    if labeled.len() < 2 {
        return Err(Error::validation(format!(
            "overlap ranking requires at least two labeled sets, {} provided",
            labeled.len()
        )));
    }
    let entries: Vec<_> = labeled.iter().collect();
    let mut overlaps = Vec::new();
    for (i, (a, set_a)) in entries.iter().enumerate() {
        for (b, set_b) in &entries[i + 1..] {
            let shared = set_a.intersection(set_b).count();
            overlaps.push((PairKey::new(a.as_str(), b.as_str()), shared));
        }
    }
    overlaps.sort_by(|x, y| y.1.cmp(&x.1));
    Ok(overlaps)
}
