//! Forbidden-rule filtering.
//!
//! Rules arrive as `(position, value token)` requirements and are resolved
//! once into value indices. A case violates a rule when it matches every
//! requirement; it is rejected when it violates any rule.

use antibody_ir::types::{ForbiddenRule, ParameterSet};

use super::combination::Obligation;
use super::TestCase;

/// Errors while resolving rules against a parameter set.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("rule #{rule} references position {position}, which does not exist")]
    UnknownPosition { rule: usize, position: usize },

    #[error("rule #{rule} references value '{value}' not in the domain of position {position}")]
    UnknownValue {
        rule: usize,
        position: usize,
        value: String,
    },
}

/// A forbidden rule over value indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRule {
    /// `(position, value index)` pairs, all of which must match.
    pub requirements: Vec<(usize, usize)>,
}

impl IndexedRule {
    pub fn matches(&self, case: &TestCase) -> bool {
        self.requirements
            .iter()
            .all(|&(pos, val)| case.values.get(pos) == Some(&val))
    }
}

/// The fixed, read-only rule set for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenSet {
    rules: Vec<IndexedRule>,
}

impl ForbiddenSet {
    pub fn new(rules: Vec<IndexedRule>) -> Self {
        Self { rules }
    }

    /// Resolve string rules into index rules.
    pub fn resolve(
        parameters: &ParameterSet,
        rules: &[ForbiddenRule],
    ) -> Result<Self, ConstraintError> {
        let mut resolved = Vec::with_capacity(rules.len());
        for (rule_index, rule) in rules.iter().enumerate() {
            let mut requirements = Vec::with_capacity(rule.requirements.len());
            for req in &rule.requirements {
                let domain = parameters.parameters.get(req.position).ok_or(
                    ConstraintError::UnknownPosition {
                        rule: rule_index,
                        position: req.position,
                    },
                )?;
                let value = domain
                    .index_of(&req.value)
                    .ok_or_else(|| ConstraintError::UnknownValue {
                        rule: rule_index,
                        position: req.position,
                        value: req.value.clone(),
                    })?;
                requirements.push((req.position, value));
            }
            resolved.push(IndexedRule { requirements });
        }
        Ok(Self { rules: resolved })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[IndexedRule] {
        &self.rules
    }

    /// True iff `case` matches every requirement of at least one rule.
    pub fn violates(&self, case: &TestCase) -> bool {
        self.rules.iter().any(|rule| rule.matches(case))
    }

    /// True when a single rule's requirements are all pinned by `obligation`,
    /// so every case satisfying it is forbidden.
    ///
    /// Sufficient, not necessary: several rules that only together rule out
    /// every completion are not detected.
    pub fn excludes(&self, obligation: &Obligation) -> bool {
        self.rules.iter().any(|rule| {
            rule.requirements.iter().all(|&(pos, val)| {
                obligation
                    .positions
                    .iter()
                    .position(|&p| p == pos)
                    .is_some_and(|k| obligation.values[k] == val)
            })
        })
    }

    /// A position whose every value is forbidden by single-requirement
    /// rules. Such a rule set admits no test case at all.
    pub fn exhausted_position(&self, domain_sizes: &[usize]) -> Option<usize> {
        let mut banned: Vec<Vec<bool>> = domain_sizes.iter().map(|&n| vec![false; n]).collect();
        for rule in &self.rules {
            if let [(pos, val)] = rule.requirements.as_slice() {
                if let Some(slot) = banned.get_mut(*pos).and_then(|b| b.get_mut(*val)) {
                    *slot = true;
                }
            }
        }
        banned
            .iter()
            .position(|values| !values.is_empty() && values.iter().all(|&b| b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antibody_ir::types::ParameterDomain;

    fn params() -> ParameterSet {
        ParameterSet::new(vec![
            ParameterDomain::new(["a1", "a2", "a3"]),
            ParameterDomain::new(["b1", "b2", "b3"]),
            ParameterDomain::new(["c1", "c2"]),
        ])
    }

    #[test]
    fn test_empty_rule_set_never_rejects() {
        let set = ForbiddenSet::default();
        assert!(!set.violates(&TestCase::new(vec![0, 0, 0])));
    }

    #[test]
    fn test_conjunctive_match() {
        let set =
            ForbiddenSet::resolve(&params(), &[ForbiddenRule::new([(0, "a1"), (1, "b1")])])
                .unwrap();
        assert!(set.violates(&TestCase::new(vec![0, 0, 1])));
        // Matching only one requirement is fine.
        assert!(!set.violates(&TestCase::new(vec![0, 1, 1])));
        assert!(!set.violates(&TestCase::new(vec![1, 0, 1])));
    }

    #[test]
    fn test_any_rule_rejects() {
        let set = ForbiddenSet::resolve(
            &params(),
            &[
                ForbiddenRule::new([(0, "a1"), (1, "b1")]),
                ForbiddenRule::new([(2, "c2")]),
            ],
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.violates(&TestCase::new(vec![2, 2, 1])));
        assert!(!set.violates(&TestCase::new(vec![2, 2, 0])));
    }

    #[test]
    fn test_resolve_rejects_unknown_value() {
        let result = ForbiddenSet::resolve(&params(), &[ForbiddenRule::new([(1, "zz")])]);
        assert!(matches!(
            result,
            Err(ConstraintError::UnknownValue { rule: 0, position: 1, .. })
        ));
        let result = ForbiddenSet::resolve(&params(), &[ForbiddenRule::new([(9, "a1")])]);
        assert!(matches!(
            result,
            Err(ConstraintError::UnknownPosition { rule: 0, position: 9 })
        ));
    }

    #[test]
    fn test_excludes_obligation() {
        let set =
            ForbiddenSet::resolve(&params(), &[ForbiddenRule::new([(0, "a1"), (1, "b1")])])
                .unwrap();
        let pinned = Obligation {
            positions: vec![0, 1],
            values: vec![0, 0],
        };
        let partial = Obligation {
            positions: vec![0, 2],
            values: vec![0, 0],
        };
        assert!(set.excludes(&pinned));
        assert!(!set.excludes(&partial));
    }

    #[test]
    fn test_excludes_ignores_rules_that_only_combine() {
        // a1 with any b is forbidden, yet no single rule sits inside (0:a1).
        let set = ForbiddenSet::resolve(
            &params(),
            &[
                ForbiddenRule::new([(0, "a1"), (1, "b1")]),
                ForbiddenRule::new([(0, "a1"), (1, "b2")]),
                ForbiddenRule::new([(0, "a1"), (1, "b3")]),
            ],
        )
        .unwrap();
        let a1 = Obligation {
            positions: vec![0],
            values: vec![0],
        };
        assert!((0..3).all(|b| set.violates(&TestCase::new(vec![0, b, 0]))));
        assert!(!set.excludes(&a1));
    }

    #[test]
    fn test_exhausted_position() {
        let set = ForbiddenSet::resolve(
            &params(),
            &[ForbiddenRule::new([(2, "c1")]), ForbiddenRule::new([(2, "c2")])],
        )
        .unwrap();
        assert_eq!(set.exhausted_position(&[3, 3, 2]), Some(2));

        let partial = ForbiddenSet::resolve(&params(), &[ForbiddenRule::new([(2, "c1")])]).unwrap();
        assert_eq!(partial.exhausted_position(&[3, 3, 2]), None);
    }
}
