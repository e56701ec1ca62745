//! Population management: seeding, clonal expansion and selection.
//!
//! Clone count grows with a parent's affinity while its mutation strength
//! shrinks, so valuable parents are reproduced often and perturbed little.

use std::collections::BTreeSet;

use rand::Rng;

use crate::space::candidate::{
    is_near_duplicate, mutate, mutation_probability, random_valid_candidate, CandidateError,
    RetryLimits,
};
use crate::space::combination::Obligation;
use crate::space::constraint::ForbiddenSet;
use crate::space::TestCase;

use super::affinity::score_all;

/// Errors while building the initial population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PopulationError {
    #[error("every value of position {position} is forbidden")]
    ExhaustedPosition { position: usize },

    #[error("no valid candidate found in {draws} random draws ({collected} of {wanted} collected)")]
    DrawsExhausted {
        draws: u32,
        collected: usize,
        wanted: usize,
    },
}

/// Settings for one round of clonal expansion.
#[derive(Debug, Clone, Copy)]
pub struct CloneSettings {
    pub duplicate_threshold: usize,
    pub min_mutation_prob: f64,
    pub retry: RetryLimits,
}

/// Offspring produced in one round, plus constraint bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ClonePool {
    pub members: Vec<TestCase>,
    /// Offspring that came from the random fallback instead of mutation.
    pub resampled: usize,
    /// Offspring dropped because neither mutation nor fallback found a valid case.
    pub deadlocks: usize,
}

/// Draw `size` valid random candidates. Duplicates are allowed.
///
/// Each candidate gets at most `max_draws` attempts before the rule set is
/// declared unsatisfiable.
pub fn initialize<R: Rng + ?Sized>(
    domain_sizes: &[usize],
    size: usize,
    forbidden: &ForbiddenSet,
    max_draws: u32,
    rng: &mut R,
) -> Result<Vec<TestCase>, PopulationError> {
    if let Some(position) = forbidden.exhausted_position(domain_sizes) {
        return Err(PopulationError::ExhaustedPosition { position });
    }

    let mut population = Vec::with_capacity(size);
    while population.len() < size {
        let candidate = random_valid_candidate(domain_sizes, forbidden, max_draws, rng).ok_or(
            PopulationError::DrawsExhausted {
                draws: max_draws,
                collected: population.len(),
                wanted: size,
            },
        )?;
        population.push(candidate);
    }
    Ok(population)
}

/// Expand each parent into `max(1, affinity)` mutated offspring.
///
/// An offspring joins the pool only if it is not a near-duplicate of a
/// member already in the pool. Constraint deadlocks drop the offspring and
/// are counted; they never abort the round.
pub fn clone_and_mutate<R: Rng + ?Sized>(
    population: &[TestCase],
    affinities: &[usize],
    domain_sizes: &[usize],
    forbidden: &ForbiddenSet,
    settings: &CloneSettings,
    rng: &mut R,
) -> ClonePool {
    let mut pool = ClonePool::default();

    for (parent, &affinity) in population.iter().zip(affinities) {
        let clone_count = affinity.max(1);
        let mutation_prob = mutation_probability(affinity, settings.min_mutation_prob);

        for _ in 0..clone_count {
            let offspring =
                match mutate(parent, domain_sizes, mutation_prob, forbidden, settings.retry, rng) {
                    Ok(offspring) => offspring,
                    Err(CandidateError::MutationDeadlock { .. }) => {
                        pool.deadlocks += 1;
                        continue;
                    }
                };
            if offspring.is_resampled() {
                pool.resampled += 1;
            }
            let child = offspring.into_case();
            if !is_near_duplicate(&child, &pool.members, settings.duplicate_threshold) {
                pool.members.push(child);
            }
        }
    }

    pool
}

/// Re-score the pool against the live coverage set and keep the best `size`.
///
/// Sorting is stable, so equal scores keep pool order. A pool smaller than
/// `size` yields a correspondingly smaller population.
pub fn select(
    pool: Vec<TestCase>,
    uncovered: &BTreeSet<Obligation>,
    size: usize,
    parallel: bool,
) -> Vec<TestCase> {
    let scores = score_all(&pool, uncovered, parallel);
    let mut ranked: Vec<(usize, TestCase)> = scores.into_iter().zip(pool).collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.truncate(size);
    ranked.into_iter().map(|(_, case)| case).collect()
}
