use std::collections::BTreeSet;

use faultcover_concise::{cover_indices, set_cover};
use faultcover_ir::{PyValue, TestCase, TestResults};

fn case(i: usize) -> TestCase {
    TestCase::new(vec![PyValue::Int(i as i64), PyValue::string("x")])
}

fn matrix(coverage: Vec<BTreeSet<usize>>) -> TestResults {
    let cases = (0..coverage.len()).map(case).collect();
    TestResults::from_coverage(cases, coverage).unwrap()
}

#[test]
fn test_single_case_covering_disjoint_pairs() {
    // Tests 0-8 catch disjoint pairs {2i, 2i + 1}; test 9 catches all 18.
    let mut coverage: Vec<BTreeSet<usize>> =
        (0..9).map(|i| BTreeSet::from([2 * i, 2 * i + 1])).collect();
    coverage.push((0..18).collect());
    let r = matrix(coverage);

    assert_eq!(r.fault_set().len(), 18);
    assert_eq!(cover_indices(&r).unwrap(), vec![9]);
    assert_eq!(set_cover(&r).unwrap(), BTreeSet::from([case(9)]));
}

#[test]
fn test_single_case_covering_chained_pairs() {
    // Ten faults: tests 0-8 catch {i, i + 1}, test 9 catches all of them.
    let mut coverage: Vec<BTreeSet<usize>> = (0..9).map(|i| BTreeSet::from([i, i + 1])).collect();
    coverage.push((0..10).collect());
    let r = matrix(coverage);

    assert_eq!(set_cover(&r).unwrap(), BTreeSet::from([case(9)]));
}

#[test]
fn test_greedy_is_not_optimal() {
    // Tests 0-4 catch {i, i + 5}; test 5 catches {0..4}. The optimum is
    // tests 0-4, but greedy takes test 5 first and then needs all the others.
    let mut coverage: Vec<BTreeSet<usize>> = (0..5).map(|i| BTreeSet::from([i, i + 5])).collect();
    coverage.push((0..5).collect());
    let r = matrix(coverage);

    assert_eq!(cover_indices(&r).unwrap(), vec![5, 0, 1, 2, 3, 4]);
    assert_eq!(set_cover(&r).unwrap().len(), 6);
}

#[test]
fn test_result_covers_every_fault() {
    let coverage = vec![
        BTreeSet::from([0, 1, 2]),
        BTreeSet::from([2, 3]),
        BTreeSet::from([3, 4, 5, 6]),
        BTreeSet::from([6, 7]),
        BTreeSet::new(),
        BTreeSet::from([0, 7]),
    ];
    let r = matrix(coverage.clone());

    let picked = cover_indices(&r).unwrap();
    let caught: BTreeSet<usize> = picked.iter().flat_map(|&i| coverage[i].iter().copied()).collect();
    assert_eq!(&caught, r.fault_set());
    assert_eq!(picked, vec![2, 0, 3]);
}

#[test]
fn test_input_is_not_mutated() {
    let mut coverage: Vec<BTreeSet<usize>> = (0..5).map(|i| BTreeSet::from([i, i + 5])).collect();
    coverage.push((0..5).collect());
    let r = matrix(coverage);
    let before = r.clone();

    set_cover(&r).unwrap();
    set_cover(&r).unwrap();
    assert_eq!(r, before);
}

#[test]
fn test_no_faults_gives_empty_set() {
    let r = matrix(vec![BTreeSet::new(); 4]);
    assert!(set_cover(&r).unwrap().is_empty());

    let empty = TestResults::from_coverage(Vec::new(), Vec::new()).unwrap();
    assert!(set_cover(&empty).unwrap().is_empty());
}
