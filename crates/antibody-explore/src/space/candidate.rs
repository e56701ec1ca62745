//! Candidate construction, mutation and comparison.
//!
//! All randomness comes from the caller's RNG so runs are reproducible.
//! Constraint retries are bounded: mutation gives up after a fixed number
//! of forbidden offspring and falls back to a fresh random candidate.

use rand::Rng;

use super::constraint::ForbiddenSet;
use super::TestCase;

/// Errors while producing a valid candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("mutation deadlock: {attempts} mutations and {fallback_draws} fresh draws were all forbidden")]
    MutationDeadlock { attempts: u32, fallback_draws: u32 },
}

/// Retry caps for constraint-driven redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryLimits {
    /// Mutation attempts from the same parent.
    pub mutation: u32,
    /// Fresh random draws once mutation gives up.
    pub fallback: u32,
}

/// How a valid offspring was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A mutated copy of the parent.
    Mutated(TestCase),
    /// The parent's neighbourhood kept hitting forbidden rules; this is a
    /// fresh random candidate instead.
    Resampled(TestCase),
}

impl Mutation {
    pub fn into_case(self) -> TestCase {
        match self {
            Mutation::Mutated(case) | Mutation::Resampled(case) => case,
        }
    }

    pub fn is_resampled(&self) -> bool {
        matches!(self, Mutation::Resampled(_))
    }
}

/// One uniform draw per position, independent across positions.
pub fn random_candidate<R: Rng + ?Sized>(domain_sizes: &[usize], rng: &mut R) -> TestCase {
    TestCase::new(
        domain_sizes
            .iter()
            .map(|&size| rng.gen_range(0..size))
            .collect(),
    )
}

/// Draw random candidates until one passes the rule set, at most `max_draws` times.
pub fn random_valid_candidate<R: Rng + ?Sized>(
    domain_sizes: &[usize],
    forbidden: &ForbiddenSet,
    max_draws: u32,
    rng: &mut R,
) -> Option<TestCase> {
    (0..max_draws)
        .map(|_| random_candidate(domain_sizes, rng))
        .find(|case| !forbidden.violates(case))
}

/// Per-position mutation probability for a parent of the given affinity.
///
/// Valuable parents are perturbed less: `1 / (1 + affinity)`, clamped to
/// `[floor, 1]`.
pub fn mutation_probability(affinity: usize, floor: f64) -> f64 {
    (1.0 / (1.0 + affinity as f64)).clamp(floor.clamp(0.0, 1.0), 1.0)
}

/// Mutate `parent`: each position is independently redrawn with
/// probability `mutation_prob` (the redraw may land on the same value).
///
/// Forbidden offspring are discarded and mutation restarts from the
/// original parent, up to `limits.mutation` times. After that a fresh random
/// valid candidate is drawn instead.
pub fn mutate<R: Rng + ?Sized>(
    parent: &TestCase,
    domain_sizes: &[usize],
    mutation_prob: f64,
    forbidden: &ForbiddenSet,
    limits: RetryLimits,
    rng: &mut R,
) -> Result<Mutation, CandidateError> {
    for _ in 0..limits.mutation {
        let mut child = parent.clone();
        for (value, &size) in child.values.iter_mut().zip(domain_sizes) {
            if rng.gen::<f64>() < mutation_prob {
                *value = rng.gen_range(0..size);
            }
        }
        if !forbidden.violates(&child) {
            return Ok(Mutation::Mutated(child));
        }
    }

    random_valid_candidate(domain_sizes, forbidden, limits.fallback, rng)
        .map(Mutation::Resampled)
        .ok_or(CandidateError::MutationDeadlock {
            attempts: limits.mutation,
            fallback_draws: limits.fallback,
        })
}

/// Whether `case` lies closer than `threshold` (Hamming) to any of `others`.
///
/// With threshold 1 only identical cases count as duplicates.
pub fn is_near_duplicate(case: &TestCase, others: &[TestCase], threshold: usize) -> bool {
    others.iter().any(|other| case.hamming(other) < threshold)
}
