//! Tester configuration: which interpreter runs the scripts and how.

use serde::{Deserialize, Serialize};

/// Configuration for running test cases through a Python interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// Interpreter command (default: `python3`).
    pub python: String,
    /// Run interpreter processes concurrently on the rayon pool.
    pub parallel: bool,
    /// Remove `.pyc` files from the candidate directory's `__pycache__`
    /// once the run finishes.
    pub clean_cache: bool,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            parallel: true,
            clean_cache: true,
        }
    }
}
