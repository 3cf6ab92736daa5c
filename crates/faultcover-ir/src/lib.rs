//! Value objects and test records shared across the faultcover crates.

pub mod case;
pub mod results;
pub mod value;

pub use case::TestCase;
pub use results::{ResultsError, TestResults};
pub use value::{PyFloat, PyValue, ValueKind};
