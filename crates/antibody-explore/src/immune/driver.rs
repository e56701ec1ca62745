//! The search driver: generate, clone, mutate, select, accept, repeat.
//!
//! Lifecycle: `Initializing -> Iterating -> Converged | Exhausted`.
//! The driver is the sole owner of the coverage set, the suite and the
//! population. Every piece of run state lives in one `SearchDriver`, so
//! independent runs never interfere.

use antibody_ir::types::{ForbiddenRule, GenerationRequest, ParameterSet, SearchConfig};
use antibody_ir::validate::{validate_request, ValidationError};
use serde::{Deserialize, Serialize};

use crate::rng::{stage_rng, INIT_STAGE};
use crate::space::candidate::RetryLimits;
use crate::space::combination::enumerate;
use crate::space::constraint::{ConstraintError, ForbiddenSet};
use crate::space::TestCase;

use super::affinity::score_all;
use super::coverage::CoverageTracker;
use super::population::{clone_and_mutate, initialize, select, CloneSettings, PopulationError};

/// Errors that stop a search before it starts.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid configuration: {0:?}")]
    InvalidConfiguration(Vec<ValidationError>),

    #[error("constraint resolution error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("unsatisfiable constraint set: {0}")]
    UnsatisfiableConstraintSet(#[from] PopulationError),
}

/// Search lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    /// Universe and initial population under construction (inside `SearchDriver::new`).
    Initializing,
    Iterating,
    /// Every obligation is covered.
    Converged,
    /// Iteration budget spent with obligations left. Not a failure.
    Exhausted,
}

impl SearchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchPhase::Converged | SearchPhase::Exhausted)
    }
}

/// Progress snapshot emitted after each iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// 1-based iteration number.
    pub iteration: usize,
    pub uncovered_before: usize,
    pub uncovered_after: usize,
    pub total: usize,
    /// Candidates appended to the suite this iteration.
    pub accepted: usize,
    pub suite_size: usize,
    pub pool_size: usize,
    pub population_size: usize,
    /// Offspring obtained from the random fallback after repeated forbidden mutations.
    pub resampled: usize,
    /// Offspring dropped because no valid case could be found.
    pub deadlocks: usize,
    pub phase: SearchPhase,
}

/// Final result: the suite plus coverage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub phase: SearchPhase,
    pub suite: Vec<TestCase>,
    pub covered: usize,
    pub total: usize,
    pub iterations: usize,
    /// Uncovered obligations that a single forbidden rule rules out.
    /// A lower bound: obligations blocked only by several rules together
    /// are not counted.
    pub uncoverable: usize,
}

impl SearchOutcome {
    pub fn coverage_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.covered as f64 / self.total as f64
        }
    }

    pub fn coverage_percent(&self) -> f64 {
        self.coverage_ratio() * 100.0
    }
}

/// Observer hook for progress reporting. Both methods default to no-ops.
pub trait ProgressObserver {
    fn on_iteration(&mut self, _report: &IterationReport) {}

    fn on_finish(&mut self, _outcome: &SearchOutcome) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

pub struct SearchDriver {
    domain_sizes: Vec<usize>,
    forbidden: ForbiddenSet,
    config: SearchConfig,
    tracker: CoverageTracker,
    population: Vec<TestCase>,
    iteration: usize,
    phase: SearchPhase,
}

impl SearchDriver {
    /// Validate the request, enumerate the obligation universe and seed the
    /// initial population. Configuration errors fail here, before any search.
    pub fn new(request: &GenerationRequest) -> Result<Self, SearchError> {
        validate_request(request).map_err(SearchError::InvalidConfiguration)?;
        Self::from_parts(&request.parameters, &request.forbidden, &request.search)
    }

    fn from_parts(
        parameters: &ParameterSet,
        rules: &[ForbiddenRule],
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        let domain_sizes = parameters.domain_sizes();
        let forbidden = ForbiddenSet::resolve(parameters, rules)?;

        let universe = enumerate(&domain_sizes, config.strength);
        tracing::debug!(
            parameters = domain_sizes.len(),
            strength = config.strength,
            obligations = universe.len(),
            rules = forbidden.len(),
            "obligation universe enumerated"
        );
        let tracker = CoverageTracker::new(universe, config.duplicate_threshold);

        let mut rng = stage_rng(config.seed, INIT_STAGE);
        let population = initialize(
            &domain_sizes,
            config.population_size,
            &forbidden,
            config.init_retry_cap,
            &mut rng,
        )?;

        Ok(Self {
            domain_sizes,
            forbidden,
            config: config.clone(),
            tracker,
            population,
            iteration: 0,
            phase: SearchPhase::Iterating,
        })
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn tracker(&self) -> &CoverageTracker {
        &self.tracker
    }

    pub fn population(&self) -> &[TestCase] {
        &self.population
    }

    pub fn forbidden(&self) -> &ForbiddenSet {
        &self.forbidden
    }

    /// Run one iteration. Returns `None` once the search is in a terminal phase.
    pub fn step(&mut self) -> Option<IterationReport> {
        if self.phase.is_terminal() {
            return None;
        }

        self.iteration += 1;
        let mut rng = stage_rng(self.config.seed, self.iteration as u64);
        let parallel = self.config.parallel_scoring;
        let uncovered_before = self.tracker.uncovered_count();

        let affinities = score_all(&self.population, self.tracker.uncovered(), parallel);
        let settings = CloneSettings {
            duplicate_threshold: self.config.duplicate_threshold,
            min_mutation_prob: self.config.min_mutation_prob,
            retry: RetryLimits {
                mutation: self.config.mutation_retry_cap,
                fallback: self.config.init_retry_cap,
            },
        };
        let pool = clone_and_mutate(
            &self.population,
            &affinities,
            &self.domain_sizes,
            &self.forbidden,
            &settings,
            &mut rng,
        );
        let pool_size = pool.members.len();
        if pool.deadlocks > 0 {
            tracing::warn!(
                iteration = self.iteration,
                deadlocks = pool.deadlocks,
                "offspring dropped: no valid case near parent or at random"
            );
        }

        self.population = select(
            pool.members,
            self.tracker.uncovered(),
            self.config.population_size,
            parallel,
        );

        // Sequential and ordered: each acceptance shrinks the set the next one sees.
        let mut accepted = 0;
        for case in &self.population {
            let outcome = self.tracker.accept(case);
            if outcome.accepted {
                accepted += 1;
            }
            if outcome.complete {
                break;
            }
        }

        if self.tracker.is_complete() {
            self.phase = SearchPhase::Converged;
        } else if self.iteration >= self.config.max_iterations {
            self.phase = SearchPhase::Exhausted;
        }

        let report = IterationReport {
            iteration: self.iteration,
            uncovered_before,
            uncovered_after: self.tracker.uncovered_count(),
            total: self.tracker.total(),
            accepted,
            suite_size: self.tracker.suite().len(),
            pool_size,
            population_size: self.population.len(),
            resampled: pool.resampled,
            deadlocks: pool.deadlocks,
            phase: self.phase,
        };
        tracing::debug!(
            iteration = report.iteration,
            uncovered = report.uncovered_after,
            accepted = report.accepted,
            suite = report.suite_size,
            population = report.population_size,
            "iteration complete"
        );
        Some(report)
    }

    /// Iterate until converged or out of budget, reporting to `observer`.
    pub fn run(mut self, observer: &mut dyn ProgressObserver) -> SearchOutcome {
        while let Some(report) = self.step() {
            observer.on_iteration(&report);
        }
        let outcome = self.finish();
        tracing::info!(
            phase = ?outcome.phase,
            iterations = outcome.iterations,
            suite = outcome.suite.len(),
            covered = outcome.covered,
            total = outcome.total,
            "search finished"
        );
        observer.on_finish(&outcome);
        outcome
    }

    /// Stop where the search stands and hand back the suite.
    pub fn finish(self) -> SearchOutcome {
        let uncoverable = self
            .tracker
            .uncovered()
            .iter()
            .filter(|o| self.forbidden.excludes(o))
            .count();
        let covered = self.tracker.covered_count();
        let total = self.tracker.total();
        SearchOutcome {
            phase: self.phase,
            covered,
            total,
            iterations: self.iteration,
            uncoverable,
            suite: self.tracker.into_suite(),
        }
    }
}

/// Convenience: build a driver and run it to completion.
pub fn run_search(
    request: &GenerationRequest,
    observer: &mut dyn ProgressObserver,
) -> Result<SearchOutcome, SearchError> {
    Ok(SearchDriver::new(request)?.run(observer))
}
