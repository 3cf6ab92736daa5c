//! Test cases: the argument lists passed to the function under test.

use std::fmt;

use crate::value::PyValue;

/// One call of the function under test: an ordered argument list.
///
/// Equality and hashing are by argument values, so a test case can be
/// deduplicated in a set regardless of how its arguments were produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestCase {
    args: Vec<PyValue>,
}

impl TestCase {
    pub fn new(args: Vec<PyValue>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[PyValue] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Python literal for each argument, in order.
    pub fn arg_literals(&self) -> Vec<String> {
        self.args.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<PyValue> for TestCase {
    fn from_iter<I: IntoIterator<Item = PyValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str("]")
    }
}
