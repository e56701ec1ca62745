//! Engine-level resource limits.
//!
//! The obligation universe grows combinatorially with parameter count and
//! strength, and every iteration scans it repeatedly. Requests are checked
//! against these caps before anything is enumerated.

use antibody_explore::space::combination::universe_size;
use antibody_ir::types::GenerationRequest;
use serde::{Deserialize, Serialize};

/// Caps applied to every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Maximum obligation universe size.
    pub max_obligations: u64,
    /// Maximum population size.
    pub max_population: usize,
    /// Maximum iteration budget.
    pub max_iterations: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_obligations: 2_000_000,
            max_population: 10_000,
            max_iterations: 100_000,
        }
    }
}

/// A request that exceeds an engine limit.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitViolation {
    TooManyObligations { size: u128, max: u64 },
    PopulationTooLarge { size: usize, max: usize },
    TooManyIterations { iterations: usize, max: usize },
}

impl std::fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyObligations { size, max } => {
                write!(f, "Obligation universe too large ({size} obligations, max {max})")
            }
            Self::PopulationTooLarge { size, max } => {
                write!(f, "Population too large ({size}, max {max})")
            }
            Self::TooManyIterations { iterations, max } => {
                write!(f, "Iteration budget too large ({iterations}, max {max})")
            }
        }
    }
}

impl std::error::Error for LimitViolation {}

/// Check a request against the engine limits without enumerating anything.
pub fn validate_limits(
    request: &GenerationRequest,
    limits: &EngineLimits,
) -> Result<(), LimitViolation> {
    let search = &request.search;
    if search.population_size > limits.max_population {
        return Err(LimitViolation::PopulationTooLarge {
            size: search.population_size,
            max: limits.max_population,
        });
    }
    if search.max_iterations > limits.max_iterations {
        return Err(LimitViolation::TooManyIterations {
            iterations: search.max_iterations,
            max: limits.max_iterations,
        });
    }
    let size = universe_size(&request.parameters.domain_sizes(), search.strength);
    if size > limits.max_obligations as u128 {
        return Err(LimitViolation::TooManyObligations {
            size,
            max: limits.max_obligations,
        });
    }
    Ok(())
}
