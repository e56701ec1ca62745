//! The t-way combination space.
//!
//! An obligation pins `t` parameter positions to specific values. The
//! universe for `(domains, t)` holds one obligation for every size-`t`
//! subset of positions and every value assignment over that subset.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TestCase;

/// A t-way coverage obligation: `positions[k]` must hold `values[k]`.
///
/// `positions` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Obligation {
    pub positions: Vec<usize>,
    pub values: Vec<usize>,
}

impl Obligation {
    /// Whether `case` assigns every pinned position its pinned value.
    pub fn is_satisfied_by(&self, case: &TestCase) -> bool {
        self.positions
            .iter()
            .zip(&self.values)
            .all(|(&pos, &val)| case.values.get(pos) == Some(&val))
    }

    pub fn strength(&self) -> usize {
        self.positions.len()
    }
}

/// All size-`t` subsets of `0..n`, each in increasing order, lexicographically.
pub fn position_combinations(n: usize, t: usize) -> Vec<Vec<usize>> {
    if t == 0 || t > n {
        return vec![];
    }

    let mut result = Vec::new();
    let mut current: Vec<usize> = (0..t).collect();

    loop {
        result.push(current.clone());

        // Rightmost slot that can still advance.
        let Some(slot) = (0..t).rev().find(|&i| current[i] < n - t + i) else {
            break;
        };
        current[slot] += 1;
        for i in (slot + 1)..t {
            current[i] = current[i - 1] + 1;
        }
    }

    result
}

/// Enumerate every obligation for the given domain sizes and strength.
///
/// Pure and deterministic; the result is the full obligation universe.
pub fn enumerate(domain_sizes: &[usize], t: usize) -> BTreeSet<Obligation> {
    let mut universe = BTreeSet::new();

    for positions in position_combinations(domain_sizes.len(), t) {
        let sizes: Vec<usize> = positions.iter().map(|&p| domain_sizes[p]).collect();
        if sizes.iter().any(|&s| s == 0) {
            continue;
        }

        // Odometer over the Cartesian product of the chosen domains.
        let mut values = vec![0usize; t];
        'product: loop {
            universe.insert(Obligation {
                positions: positions.clone(),
                values: values.clone(),
            });

            for digit in (0..t).rev() {
                values[digit] += 1;
                if values[digit] < sizes[digit] {
                    continue 'product;
                }
                values[digit] = 0;
            }
            break;
        }
    }

    universe
}

/// Size of the obligation universe, computed without enumerating it.
///
/// This is the elementary symmetric polynomial of degree `t` over the domain
/// sizes, built one domain at a time in `O(n * t)`. Saturates at `u128::MAX`
/// for absurd inputs.
pub fn universe_size(domain_sizes: &[usize], t: usize) -> u128 {
    if t == 0 || t > domain_sizes.len() {
        return 0;
    }
    // e[j]: obligation count of strength j over the domains seen so far.
    let mut e = vec![0u128; t + 1];
    e[0] = 1;
    for &size in domain_sizes {
        for j in (1..=t).rev() {
            e[j] = e[j].saturating_add(e[j - 1].saturating_mul(size as u128));
        }
    }
    e[t]
}

/// Independent coverage audit of a finished suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageAudit {
    pub covered: usize,
    pub total: usize,
}

impl CoverageAudit {
    pub fn is_complete(&self) -> bool {
        self.covered == self.total
    }
}

/// Recompute from scratch how many obligations `suite` satisfies.
pub fn check_coverage(suite: &[TestCase], domain_sizes: &[usize], t: usize) -> CoverageAudit {
    let universe = enumerate(domain_sizes, t);
    let covered = universe
        .iter()
        .filter(|o| suite.iter().any(|case| o.is_satisfied_by(case)))
        .count();
    CoverageAudit {
        covered,
        total: universe.len(),
    }
}
