//! Coverage tracking and suite acceptance.
//!
//! The tracker owns the set of uncovered obligations and the growing test
//! suite. Obligations only ever leave the set, and the suite only grows.

use std::collections::BTreeSet;

use crate::space::candidate::is_near_duplicate;
use crate::space::combination::Obligation;
use crate::space::TestCase;

/// What `CoverageTracker::accept` did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceptance {
    /// Obligations the candidate newly satisfied (0 when rejected).
    pub newly_covered: usize,
    /// Whether the candidate joined the suite.
    pub accepted: bool,
    /// Whether the coverage set is now empty.
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct CoverageTracker {
    uncovered: BTreeSet<Obligation>,
    total: usize,
    suite: Vec<TestCase>,
    duplicate_threshold: usize,
}

impl CoverageTracker {
    /// Start with every obligation of `universe` uncovered and an empty suite.
    pub fn new(universe: BTreeSet<Obligation>, duplicate_threshold: usize) -> Self {
        Self {
            total: universe.len(),
            uncovered: universe,
            suite: Vec::new(),
            duplicate_threshold,
        }
    }

    /// Offer a candidate to the suite.
    ///
    /// It is appended only if it satisfies at least one uncovered obligation
    /// and is not a near-duplicate of a suite member; the obligations it
    /// satisfies are then removed. Otherwise nothing changes.
    pub fn accept(&mut self, case: &TestCase) -> Acceptance {
        let newly_covered = self
            .uncovered
            .iter()
            .filter(|o| o.is_satisfied_by(case))
            .count();

        if newly_covered == 0 || is_near_duplicate(case, &self.suite, self.duplicate_threshold) {
            return Acceptance {
                newly_covered: 0,
                accepted: false,
                complete: self.is_complete(),
            };
        }

        self.uncovered.retain(|o| !o.is_satisfied_by(case));
        self.suite.push(case.clone());

        Acceptance {
            newly_covered,
            accepted: true,
            complete: self.is_complete(),
        }
    }

    pub fn uncovered(&self) -> &BTreeSet<Obligation> {
        &self.uncovered
    }

    pub fn uncovered_count(&self) -> usize {
        self.uncovered.len()
    }

    pub fn covered_count(&self) -> usize {
        self.total - self.uncovered.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }

    pub fn suite(&self) -> &[TestCase] {
        &self.suite
    }

    pub fn into_suite(self) -> Vec<TestCase> {
        self.suite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::combination::enumerate;

    fn tracker() -> CoverageTracker {
        CoverageTracker::new(enumerate(&[2, 2], 2), 1)
    }

    #[test]
    fn test_accept_covers_and_appends() {
        let mut t = tracker();
        let result = t.accept(&TestCase::new(vec![0, 1]));
        assert_eq!(
            result,
            Acceptance {
                newly_covered: 1,
                accepted: true,
                complete: false
            }
        );
        assert_eq!(t.covered_count(), 1);
        assert_eq!(t.uncovered_count(), 3);
        assert_eq!(t.suite().len(), 1);
    }

    #[test]
    fn test_duplicate_is_rejected_without_state_change() {
        let mut t = tracker();
        t.accept(&TestCase::new(vec![0, 1]));
        let again = t.accept(&TestCase::new(vec![0, 1]));
        assert!(!again.accepted);
        assert_eq!(t.suite().len(), 1);
        assert_eq!(t.uncovered_count(), 3);
    }

    #[test]
    fn test_near_duplicate_with_covering_value_is_rejected() {
        let mut t = CoverageTracker::new(enumerate(&[2, 2, 2], 1), 2);
        t.accept(&TestCase::new(vec![0, 0, 0]));
        // Covers a new obligation but is within distance 2 of a suite member.
        let close = t.accept(&TestCase::new(vec![1, 0, 0]));
        assert!(!close.accepted);
        let far = t.accept(&TestCase::new(vec![1, 1, 1]));
        assert!(far.accepted);
        assert!(far.complete);
    }

    #[test]
    fn test_full_coverage_reports_complete() {
        let mut t = tracker();
        for case in [[0, 0], [0, 1], [1, 0]] {
            assert!(!t.accept(&TestCase::new(case.to_vec())).complete);
        }
        let last = t.accept(&TestCase::new(vec![1, 1]));
        assert!(last.accepted && last.complete);
        assert!(t.is_complete());
        assert_eq!(t.covered_count(), t.total());
    }

    #[test]
    fn test_case_covering_nothing_new_is_rejected() {
        let mut t = CoverageTracker::new(enumerate(&[2, 2, 2], 1), 1);
        t.accept(&TestCase::new(vec![0, 0, 0]));
        let result = t.accept(&TestCase::new(vec![0, 0, 0]));
        assert!(!result.accepted);
        t.accept(&TestCase::new(vec![1, 1, 1]));
        // Not a duplicate of either member, but every value it uses is already covered.
        let redundant = t.accept(&TestCase::new(vec![0, 1, 0]));
        assert_eq!(redundant.newly_covered, 0);
        assert!(!redundant.accepted);
    }
}
