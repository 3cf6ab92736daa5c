use std::collections::BTreeSet;

use faultcover_gen::rng::generation_rng;
use faultcover_gen::{BaseSetGenerator, GenError, GenNode};
use faultcover_ir::{PyValue, TestCase};

fn case(args: &[PyValue]) -> TestCase {
    TestCase::new(args.to_vec())
}

#[test]
fn test_single_int_parameter_exhaustive_only() {
    let generator = BaseSetGenerator::new(vec![GenNode::int([17], [17]).unwrap()], 0);
    let mut rng = generation_rng(1);
    let base = generator.base_set(&mut rng).unwrap();
    assert_eq!(base, vec![case(&[PyValue::Int(17)])]);
}

#[test]
fn test_exhaustive_covers_every_value() {
    let node = GenNode::int([-7, -5, -3, -1, 1, 3, 5, 7], [0]).unwrap();
    let generator = BaseSetGenerator::new(vec![node], 0);
    let exhaustive = generator.exhaustive_tests();
    assert_eq!(exhaustive.len(), 8);
    for i in [-7, -5, -3, -1, 1, 3, 5, 7] {
        assert!(exhaustive.contains(&case(&[PyValue::Int(i)])));
    }
}

#[test]
fn test_exhaustive_cartesian_product_of_parameters() {
    let generator = BaseSetGenerator::new(
        vec![
            GenNode::bool([0, 1], [0]).unwrap(),
            GenNode::string("ab", [0, 1], [0]).unwrap(),
            GenNode::float([0.5], [0.5]).unwrap(),
        ],
        0,
    );
    let exhaustive = generator.exhaustive_tests();
    // 2 bools x ("", "a", "b") x 1 float
    assert_eq!(exhaustive.len(), 6);
    assert!(exhaustive.contains(&case(&[
        PyValue::Bool(true),
        PyValue::string("b"),
        PyValue::float(0.5),
    ])));
    assert!(exhaustive.iter().all(|c| c.arity() == 3));
}

#[test]
fn test_no_parameters_yields_single_empty_case() {
    let generator = BaseSetGenerator::new(Vec::new(), 0);
    let exhaustive = generator.exhaustive_tests();
    assert_eq!(exhaustive, BTreeSet::from([TestCase::new(Vec::new())]));
}

#[test]
fn test_random_tests_exact_count_and_disjoint() {
    let nodes = vec![
        GenNode::int([0, 1], (0..20).collect::<Vec<i64>>()).unwrap(),
        GenNode::list(GenNode::bool([0], [0, 1]).unwrap(), [0], [0, 1, 2]).unwrap(),
    ];
    let generator = BaseSetGenerator::new(nodes, 25);
    let exhaustive = generator.exhaustive_tests();
    let mut rng = generation_rng(7);
    let random = generator.random_tests(&exhaustive, &mut rng).unwrap();

    assert_eq!(random.len(), 25);
    assert!(random.is_disjoint(&exhaustive));
    for c in &random {
        let n = c.args()[0].as_int().unwrap();
        assert!((0..20).contains(&n));
        let items = c.args()[1].elements().unwrap();
        assert!(items.len() <= 2);
    }
}

#[test]
fn test_base_set_is_union_in_order() {
    let generator = BaseSetGenerator::new(
        vec![GenNode::int([1, 2, 3], (1..=50).collect::<Vec<i64>>()).unwrap()],
        10,
    );
    let mut rng = generation_rng(3);
    let base = generator.base_set(&mut rng).unwrap();

    assert_eq!(base.len(), 3 + 10);
    let mut sorted = base.clone();
    sorted.sort();
    assert_eq!(base, sorted);
    for i in 1..=3 {
        assert!(base.contains(&case(&[PyValue::Int(i)])));
    }
    let distinct: BTreeSet<_> = base.iter().collect();
    assert_eq!(distinct.len(), base.len());
}

#[test]
fn test_base_set_deterministic_for_seed() {
    let generator = BaseSetGenerator::new(
        vec![
            GenNode::float([0.0], [-2.3, 1.2, -9.0, 4.75]).unwrap(),
            GenNode::string("xyz", [0], [1, 2, 3]).unwrap(),
        ],
        12,
    );
    let a = generator.base_set(&mut generation_rng(99)).unwrap();
    let b = generator.base_set(&mut generation_rng(99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_random_space_too_small() {
    let generator = BaseSetGenerator::new(vec![GenNode::bool([0], [0, 1]).unwrap()], 3);
    let err = generator.base_set(&mut generation_rng(5)).unwrap_err();
    assert!(matches!(
        err,
        GenError::RandomSpaceTooSmall {
            requested: 3,
            available: 1,
        }
    ));
}

#[test]
fn test_random_space_swallowed_by_exhaustive() {
    // The random domain is a subset of the exhaustive one, so no random
    // draw can ever be new.
    let generator = BaseSetGenerator::new(vec![GenNode::int([1, 2, 3], [1, 2]).unwrap()], 1);
    let err = generator.base_set(&mut generation_rng(5)).unwrap_err();
    assert!(matches!(
        err,
        GenError::RandomSpaceTooSmall {
            requested: 1,
            available: 0,
        }
    ));
}

#[test]
fn test_random_finds_single_remaining_new_case() {
    // Only 50_000 lies outside the exhaustive set, one draw in 50_001.
    let node = GenNode::int(0..50_000, 0..=50_000).unwrap();
    let generator = BaseSetGenerator::new(vec![node], 1);
    assert_eq!(generator.new_random_count(&generator.exhaustive_tests()), 1);

    for seed in 0..3 {
        let base = generator.base_set(&mut generation_rng(seed)).unwrap();
        assert_eq!(base.len(), 50_001);
        assert_eq!(base.last(), Some(&case(&[PyValue::Int(50_000)])));
    }
}

#[test]
fn test_draw_budget_is_opt_in() {
    let node = GenNode::int([1, 2, 3], [1, 2, 3, 4]).unwrap();
    let unbounded = BaseSetGenerator::new(vec![node.clone()], 1);
    assert_eq!(unbounded.max_attempts(), None);

    let bounded = BaseSetGenerator::new(vec![node], 1).with_max_attempts(0);
    assert_eq!(bounded.max_attempts(), Some(0));
    let err = bounded.base_set(&mut generation_rng(5)).unwrap_err();
    assert!(matches!(
        err,
        GenError::RandomSpaceExhausted {
            requested: 1,
            accepted: 0,
            attempts: 0,
        }
    ));
}

#[test]
fn test_new_random_count_ignores_cases_outside_random_space() {
    let generator = BaseSetGenerator::new(
        vec![
            GenNode::bool([0, 1], [0, 1]).unwrap(),
            GenNode::list(GenNode::int([5], [1, 2]).unwrap(), [0, 1], [1]).unwrap(),
        ],
        0,
    );
    // Random space: 2 bools x ([1], [2]) = 4. The exhaustive cases use
    // [] and [5], which the random path never yields.
    assert_eq!(generator.new_random_count(&generator.exhaustive_tests()), 4);

    let existing = BTreeSet::from([
        case(&[PyValue::Bool(true), PyValue::list([PyValue::Int(2)])]),
        case(&[PyValue::Bool(true), PyValue::list([PyValue::Int(5)])]),
    ]);
    assert_eq!(generator.new_random_count(&existing), 3);
}

#[test]
fn test_random_fills_whole_space_when_requested() {
    let generator = BaseSetGenerator::new(
        vec![
            GenNode::bool([0], [0, 1]).unwrap(),
            GenNode::int([0], [10, 20]).unwrap(),
        ],
        4,
    );
    let random = generator
        .random_tests(&BTreeSet::new(), &mut generation_rng(8))
        .unwrap();
    assert_eq!(random.len(), 4);
}

#[test]
fn test_generator_accessors() {
    let generator = BaseSetGenerator::new(vec![GenNode::int([1], [1]).unwrap()], 100);
    assert_eq!(generator.num_random(), 100);
    assert_eq!(generator.nodes().len(), 1);
    assert_eq!(generator.max_attempts(), None);
}
