//! Run analytics.
//!
//! Records a coverage curve and per-iteration suite growth while a search
//! runs, for run-level observability.

use std::time::Instant;

use antibody_explore::immune::driver::{
    IterationReport, ProgressObserver, SearchOutcome, SearchPhase,
};
use serde::{Deserialize, Serialize};

/// Coverage measured after one iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveragePoint {
    pub iteration: usize,
    pub covered: usize,
    pub total: usize,
    /// Coverage fraction (0.0-1.0).
    pub percent: f64,
}

/// Per-iteration search statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub accepted: usize,
    pub suite_size: usize,
    pub pool_size: usize,
    pub population_size: usize,
    pub resampled: usize,
    pub deadlocks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAnalytics {
    pub coverage_curve: Vec<CoveragePoint>,
    pub iteration_stats: Vec<IterationStats>,
    pub total_resampled: usize,
    pub total_deadlocks: usize,
    pub peak_coverage: f64,
    pub elapsed_secs: f64,
    pub phase: SearchPhase,
    #[serde(skip)]
    started: Option<Instant>,
}

impl RunAnalytics {
    pub fn new() -> Self {
        Self {
            coverage_curve: Vec::new(),
            iteration_stats: Vec::new(),
            total_resampled: 0,
            total_deadlocks: 0,
            peak_coverage: 0.0,
            elapsed_secs: 0.0,
            phase: SearchPhase::Initializing,
            started: Some(Instant::now()),
        }
    }

    /// Record a coverage measurement.
    pub fn record_coverage(&mut self, iteration: usize, covered: usize, total: usize) {
        let percent = if total > 0 {
            covered as f64 / total as f64
        } else {
            0.0
        };

        self.coverage_curve.push(CoveragePoint {
            iteration,
            covered,
            total,
            percent,
        });

        if percent > self.peak_coverage {
            self.peak_coverage = percent;
        }
    }

    /// Iterations whose acceptance walk grew the suite.
    pub fn productive_iterations(&self) -> usize {
        self.iteration_stats.iter().filter(|s| s.accepted > 0).count()
    }

    /// Last recorded coverage fraction.
    pub fn final_coverage(&self) -> f64 {
        self.coverage_curve.last().map(|p| p.percent).unwrap_or(0.0)
    }
}

impl Default for RunAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for RunAnalytics {
    fn on_iteration(&mut self, report: &IterationReport) {
        self.phase = report.phase;
        self.record_coverage(
            report.iteration,
            report.total - report.uncovered_after,
            report.total,
        );
        self.total_resampled += report.resampled;
        self.total_deadlocks += report.deadlocks;
        self.iteration_stats.push(IterationStats {
            iteration: report.iteration,
            accepted: report.accepted,
            suite_size: report.suite_size,
            pool_size: report.pool_size,
            population_size: report.population_size,
            resampled: report.resampled,
            deadlocks: report.deadlocks,
        });
    }

    fn on_finish(&mut self, outcome: &SearchOutcome) {
        self.phase = outcome.phase;
        if let Some(started) = self.started {
            self.elapsed_secs = started.elapsed().as_secs_f64();
        }
    }
}
