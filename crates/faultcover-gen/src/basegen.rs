//! Base test set generation.
//!
//! The base set is the union of:
//! 1. the **exhaustive** set: the full Cartesian product of every
//!    parameter's exhaustive values;
//! 2. a requested number of **random** cases, each distinct from every
//!    other case already in the set.
//!
//! The random phase redraws duplicates until it has enough new cases. It
//! first checks that enough new cases exist, so the loop always ends; an
//! optional draw budget bounds how long it may take.

use std::collections::BTreeSet;

use faultcover_ir::{PyValue, TestCase};
use log::debug;
use rand::Rng;

use crate::node::{DomainRole, GenNode};

/// Errors during base set generation.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error(
        "random domain only holds {available} test cases not already in the base set, \
         but {requested} random cases were requested"
    )]
    RandomSpaceTooSmall { requested: usize, available: u128 },

    #[error(
        "accepted {accepted} of {requested} random test cases after {attempts} draws; \
         the draw budget ran out"
    )]
    RandomSpaceExhausted {
        requested: usize,
        accepted: usize,
        attempts: usize,
    },
}

/// Builds base test sets from one generator node per parameter.
#[derive(Debug, Clone)]
pub struct BaseSetGenerator {
    nodes: Vec<GenNode>,
    num_random: usize,
    max_attempts: Option<usize>,
}

impl BaseSetGenerator {
    pub fn new(nodes: Vec<GenNode>, num_random: usize) -> Self {
        Self {
            nodes,
            num_random,
            max_attempts: None,
        }
    }

    /// Bound the total number of random draws the random phase may make.
    /// Without a bound it draws until it has `num_random` new cases.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn nodes(&self) -> &[GenNode] {
        &self.nodes
    }

    pub fn num_random(&self) -> usize {
        self.num_random
    }

    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    /// Base set = exhaustive ∪ random, in `TestCase` order.
    ///
    /// The order is stable for a given seed, so callers may refer to cases
    /// by index.
    pub fn base_set<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<TestCase>, GenError> {
        let mut base = self.exhaustive_tests();
        let exhaustive_len = base.len();
        let random = self.random_tests(&base, rng)?;
        base.extend(random);

        debug!(
            "base set: {} exhaustive + {} random = {} cases",
            exhaustive_len,
            base.len() - exhaustive_len,
            base.len()
        );
        Ok(base.into_iter().collect())
    }

    /// Every combination of exhaustive values across the parameters.
    pub fn exhaustive_tests(&self) -> BTreeSet<TestCase> {
        let possible_args: Vec<Vec<PyValue>> = self
            .nodes
            .iter()
            .map(|node| node.exhaustive_values().into_iter().collect())
            .collect();

        arg_combos(&possible_args)
            .into_iter()
            .map(TestCase::new)
            .collect()
    }

    /// Exactly `num_random` random test cases, none of which appears in
    /// `existing` or twice in the result.
    pub fn random_tests<R: Rng + ?Sized>(
        &self,
        existing: &BTreeSet<TestCase>,
        rng: &mut R,
    ) -> Result<BTreeSet<TestCase>, GenError> {
        let available = self.new_random_count(existing);
        if available < self.num_random as u128 {
            return Err(GenError::RandomSpaceTooSmall {
                requested: self.num_random,
                available,
            });
        }

        let mut accepted = BTreeSet::new();
        let mut attempts = 0usize;
        while accepted.len() < self.num_random {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(GenError::RandomSpaceExhausted {
                    requested: self.num_random,
                    accepted: accepted.len(),
                    attempts,
                });
            }
            attempts += 1;

            let case: TestCase = self.nodes.iter().map(|node| node.random_value(rng)).collect();
            if !existing.contains(&case) {
                accepted.insert(case);
            }
        }

        debug!(
            "random phase: accepted {} cases in {} draws",
            accepted.len(),
            attempts
        );
        Ok(accepted)
    }

    /// Number of cases the random phase can produce that are not in
    /// `existing`.
    pub fn new_random_count(&self, existing: &BTreeSet<TestCase>) -> u128 {
        let space = self
            .nodes
            .iter()
            .map(GenNode::random_count)
            .fold(1u128, u128::saturating_mul);
        if space == u128::MAX {
            return space;
        }

        let reachable = existing
            .iter()
            .filter(|case| {
                case.arity() == self.nodes.len()
                    && self
                        .nodes
                        .iter()
                        .zip(case.args())
                        .all(|(node, arg)| node.can_produce(DomainRole::Random, arg))
            })
            .count();
        space.saturating_sub(reachable as u128)
    }
}

/// All argument lists choosing one value per parameter.
///
/// Built back to front: every combination of the later parameters is
/// prefixed with each value of the current one.
fn arg_combos(possible_args: &[Vec<PyValue>]) -> Vec<Vec<PyValue>> {
    let Some((current, later)) = possible_args.split_first() else {
        return vec![Vec::new()];
    };

    let later_combos = arg_combos(later);
    let mut combos = Vec::with_capacity(current.len() * later_combos.len());
    for arg in current {
        for combo in &later_combos {
            let mut args = Vec::with_capacity(combo.len() + 1);
            args.push(arg.clone());
            args.extend(combo.iter().cloned());
            combos.push(args);
        }
    }
    combos
}
