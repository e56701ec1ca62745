//! Caller-facing suite report.

use antibody_explore::immune::driver::{SearchOutcome, SearchPhase};
use antibody_explore::space::combination::check_coverage;
use antibody_ir::types::{GenerationRequest, ParameterSet};
use serde::{Deserialize, Serialize};

use crate::analytics::RunAnalytics;

/// The generated suite with its coverage accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Parameter labels, in position order.
    pub parameters: Vec<String>,
    /// Each test case as value tokens.
    pub suite: Vec<Vec<String>>,
    pub strength: usize,
    pub covered: usize,
    pub total: usize,
    pub uncoverable: usize,
    pub phase: SearchPhase,
    pub iterations: usize,
    /// Coverage recomputed from the final suite alone.
    pub audited_covered: usize,
    pub analytics: RunAnalytics,
}

impl SuiteReport {
    pub fn build(
        request: &GenerationRequest,
        outcome: &SearchOutcome,
        analytics: RunAnalytics,
    ) -> Self {
        let parameters: &ParameterSet = &request.parameters;
        let audit = check_coverage(
            &outcome.suite,
            &parameters.domain_sizes(),
            request.search.strength,
        );
        Self {
            parameters: (0..parameters.len()).map(|p| parameters.label(p)).collect(),
            suite: outcome
                .suite
                .iter()
                .map(|case| case.render(parameters))
                .collect(),
            strength: request.search.strength,
            covered: outcome.covered,
            total: outcome.total,
            uncoverable: outcome.uncoverable,
            phase: outcome.phase,
            iterations: outcome.iterations,
            audited_covered: audit.covered,
            analytics,
        }
    }

    pub fn coverage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.covered as f64 / self.total as f64 * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SearchPhase::Converged
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_complete() {
            writeln!(f, "All {}-way combinations are covered!", self.strength)?;
        }
        writeln!(f, "Final Test Suite Size: {}", self.suite.len())?;
        writeln!(
            f,
            "Coverage Achieved: {}/{} ({:.2}%)",
            self.covered,
            self.total,
            self.coverage_percent()
        )?;
        if self.uncoverable > 0 {
            writeln!(
                f,
                "Uncoverable under forbidden rules: {}",
                self.uncoverable
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Generated Test Suite:")?;
        for (idx, case) in self.suite.iter().enumerate() {
            writeln!(f, "Test Case {}: [{}]", idx + 1, case.join(", "))?;
        }
        Ok(())
    }
}
