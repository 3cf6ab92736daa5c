//! Execution outcomes: which test cases caught which candidates.

use std::collections::BTreeSet;

use crate::case::TestCase;

/// Errors building a [`TestResults`].
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("{cases} test cases but {coverage} coverage sets")]
    LengthMismatch { cases: usize, coverage: usize },
}

/// Fault matrix produced by executing a base set against the candidates.
///
/// `case_to_faults[i]` holds the indices of the candidates that test case
/// `i` caught; `fault_set` holds every candidate caught by at least one
/// case. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResults {
    cases: Vec<TestCase>,
    case_to_faults: Vec<BTreeSet<usize>>,
    fault_set: BTreeSet<usize>,
}

impl TestResults {
    pub fn new(
        cases: Vec<TestCase>,
        case_to_faults: Vec<BTreeSet<usize>>,
        fault_set: BTreeSet<usize>,
    ) -> Result<Self, ResultsError> {
        if cases.len() != case_to_faults.len() {
            return Err(ResultsError::LengthMismatch {
                cases: cases.len(),
                coverage: case_to_faults.len(),
            });
        }
        Ok(Self {
            cases,
            case_to_faults,
            fault_set,
        })
    }

    /// Build results whose fault set is the union of the coverage sets.
    pub fn from_coverage(
        cases: Vec<TestCase>,
        case_to_faults: Vec<BTreeSet<usize>>,
    ) -> Result<Self, ResultsError> {
        let fault_set = case_to_faults.iter().flatten().copied().collect();
        Self::new(cases, case_to_faults, fault_set)
    }

    /// The test case at `index`, if in bounds.
    pub fn test_case(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn case_to_faults(&self) -> &[BTreeSet<usize>] {
        &self.case_to_faults
    }

    pub fn fault_set(&self) -> &BTreeSet<usize> {
        &self.fault_set
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
