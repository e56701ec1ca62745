//! Affinity: how many still-uncovered obligations a candidate would satisfy.
//!
//! Always computed against the live coverage set, never cached. Scoring is
//! read-only, so a batch may be scored on the rayon pool; results keep the
//! input order either way.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::space::combination::Obligation;
use crate::space::TestCase;

/// Count the obligations in `uncovered` that `case` satisfies.
pub fn affinity(case: &TestCase, uncovered: &BTreeSet<Obligation>) -> usize {
    uncovered.iter().filter(|o| o.is_satisfied_by(case)).count()
}

/// Score every case, in order.
pub fn score_all(
    cases: &[TestCase],
    uncovered: &BTreeSet<Obligation>,
    parallel: bool,
) -> Vec<usize> {
    if parallel {
        cases.par_iter().map(|case| affinity(case, uncovered)).collect()
    } else {
        cases.iter().map(|case| affinity(case, uncovered)).collect()
    }
}
