pub mod candidate;
pub mod combination;
pub mod constraint;

use antibody_ir::types::ParameterSet;
use serde::{Deserialize, Serialize};

/// One test case: a value index per parameter position.
///
/// Indices address the parameter's domain, so position `i` holds a value
/// in `0..domain_sizes[i]`. Equality and Hamming distance are positional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestCase {
    pub values: Vec<usize>,
}

impl TestCase {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of positions at which the two cases differ.
    pub fn hamming(&self, other: &TestCase) -> usize {
        self.values
            .iter()
            .zip(&other.values)
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Map value indices back to the domain's value tokens.
    pub fn render(&self, parameters: &ParameterSet) -> Vec<String> {
        self.values
            .iter()
            .zip(&parameters.parameters)
            .map(|(&index, domain)| domain.values[index].clone())
            .collect()
    }

    /// Build a case from value tokens. `None` if a token is not in its domain
    /// or the width does not match.
    pub fn from_tokens(parameters: &ParameterSet, tokens: &[&str]) -> Option<Self> {
        if tokens.len() != parameters.len() {
            return None;
        }
        tokens
            .iter()
            .zip(&parameters.parameters)
            .map(|(token, domain)| domain.index_of(token))
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }
}

impl std::fmt::Display for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
