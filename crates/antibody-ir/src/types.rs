use serde::{Deserialize, Serialize};

/// Top-level generation request: what to cover, what to avoid, how to search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub parameters: ParameterSet,
    #[serde(default)]
    pub forbidden: Vec<ForbiddenRule>,
    #[serde(default)]
    pub search: SearchConfig,
}

// ── Parameters ───────────────────────────────────────────────────────

/// One parameter slot and the ordered values it may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDomain {
    #[serde(default)]
    pub name: Option<String>,
    pub values: Vec<String>,
}

impl ParameterDomain {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.to_string()),
            ..Self::new(values)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of `value` inside this domain.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// Ordered parameter domains. Its length fixes the width of every test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    pub parameters: Vec<ParameterDomain>,
}

impl ParameterSet {
    pub fn new(parameters: Vec<ParameterDomain>) -> Self {
        Self { parameters }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Size of each domain, in parameter order.
    pub fn domain_sizes(&self) -> Vec<usize> {
        self.parameters.iter().map(ParameterDomain::len).collect()
    }

    /// Display label for a position: its name, or `p{index}`.
    pub fn label(&self, position: usize) -> String {
        self.parameters
            .get(position)
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| format!("p{position}"))
    }
}

// ── Constraints ──────────────────────────────────────────────────────

/// A single `(position, value)` requirement of a forbidden rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub position: usize,
    pub value: String,
}

/// Conjunctive constraint: a test case matching every requirement is forbidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForbiddenRule {
    pub requirements: Vec<Requirement>,
}

impl ForbiddenRule {
    pub fn new<S: Into<String>>(pairs: impl IntoIterator<Item = (usize, S)>) -> Self {
        Self {
            requirements: pairs
                .into_iter()
                .map(|(position, value)| Requirement {
                    position,
                    value: value.into(),
                })
                .collect(),
        }
    }
}

// ── Search configuration ─────────────────────────────────────────────

/// Tuning knobs for the immune search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Interaction strength `t`.
    pub strength: usize,
    /// Number of candidates kept between iterations.
    pub population_size: usize,
    /// Iteration budget before the search stops with partial coverage.
    pub max_iterations: usize,
    /// RNG seed. Same seed and inputs produce the same suite.
    pub seed: u64,
    /// Candidates closer than this Hamming distance count as duplicates.
    pub duplicate_threshold: usize,
    /// Mutation attempts before falling back to a fresh random candidate.
    pub mutation_retry_cap: u32,
    /// Random draws allowed per initial candidate.
    pub init_retry_cap: u32,
    /// Lower clamp for the per-position mutation probability.
    pub min_mutation_prob: f64,
    /// Score population and clone pool on the rayon thread pool.
    pub parallel_scoring: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strength: 2,
            population_size: 20,
            max_iterations: 75,
            seed: 42,
            duplicate_threshold: 1,
            mutation_retry_cap: 64,
            init_retry_cap: 1000,
            min_mutation_prob: 0.05,
            parallel_scoring: false,
        }
    }
}
