//! Greedy set cover.
//!
//! Picks test cases from a [`TestResults`] fault matrix until every fault in
//! its fault set is caught by at least one pick:
//! 1. Scan the cases in index order and take the one covering the most
//!    still-uncaught faults (the first case wins ties).
//! 2. Drop the faults it catches from the remaining set and from every
//!    case's coverage.
//! 3. Repeat until no faults remain.
//!
//! This is the classical ln(n)-approximation, not an exact minimum.

use std::collections::BTreeSet;

use faultcover_ir::{TestCase, TestResults};
use log::debug;

/// Errors during minimization.
#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    #[error("no test case catches faults {faults:?}")]
    Uncoverable { faults: BTreeSet<usize> },
}

/// Indices of the chosen test cases, in the order they were picked.
///
/// Works on private copies; `results` is left untouched.
pub fn cover_indices(results: &TestResults) -> Result<Vec<usize>, CoverError> {
    let mut remaining: BTreeSet<usize> = results.fault_set().clone();
    let mut coverage: Vec<BTreeSet<usize>> = results
        .case_to_faults()
        .iter()
        .map(|faults| faults.intersection(&remaining).copied().collect())
        .collect();

    let mut picked = Vec::new();
    while !remaining.is_empty() {
        let mut best: Option<usize> = None;
        let mut best_len = 0usize;
        for (index, faults) in coverage.iter().enumerate() {
            if faults.len() > best_len {
                best = Some(index);
                best_len = faults.len();
            }
        }

        let Some(best) = best else {
            return Err(CoverError::Uncoverable { faults: remaining });
        };

        let caught = std::mem::take(&mut coverage[best]);
        debug!("picked case {best}, catching {} faults", caught.len());
        for faults in coverage.iter_mut() {
            faults.retain(|f| !caught.contains(f));
        }
        remaining.retain(|f| !caught.contains(f));
        picked.push(best);
    }

    Ok(picked)
}

/// The concise test set: the chosen test cases themselves.
pub fn set_cover(results: &TestResults) -> Result<BTreeSet<TestCase>, CoverError> {
    let indices = cover_indices(results)?;
    Ok(indices
        .into_iter()
        .filter_map(|index| results.test_case(index).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultcover_ir::PyValue;

    fn results(coverage: &[&[usize]]) -> TestResults {
        let cases = (0..coverage.len())
            .map(|i| TestCase::new(vec![PyValue::Int(i as i64)]))
            .collect();
        let coverage = coverage
            .iter()
            .map(|faults| faults.iter().copied().collect())
            .collect();
        TestResults::from_coverage(cases, coverage).unwrap()
    }

    #[test]
    fn test_first_case_wins_ties() {
        let r = results(&[&[0], &[1], &[0, 1], &[1, 0]]);
        assert_eq!(cover_indices(&r).unwrap(), vec![2]);
    }

    #[test]
    fn test_empty_fault_set_picks_nothing() {
        let r = results(&[&[], &[]]);
        assert!(cover_indices(&r).unwrap().is_empty());
    }

    #[test]
    fn test_faults_outside_fault_set_are_ignored() {
        let cases = vec![
            TestCase::new(vec![PyValue::Int(0)]),
            TestCase::new(vec![PyValue::Int(1)]),
        ];
        let coverage = vec![BTreeSet::from([5, 6, 7]), BTreeSet::from([1])];
        let r = TestResults::new(cases, coverage, BTreeSet::from([1])).unwrap();
        assert_eq!(cover_indices(&r).unwrap(), vec![1]);
    }

    #[test]
    fn test_uncoverable_fault_reported() {
        let cases = vec![TestCase::new(vec![PyValue::Int(0)])];
        let r = TestResults::new(cases, vec![BTreeSet::from([0])], BTreeSet::from([0, 3])).unwrap();
        let err = cover_indices(&r).unwrap_err();
        assert!(matches!(err, CoverError::Uncoverable { faults } if faults == BTreeSet::from([3])));
    }
}
