//! Execution of base test sets through a Python interpreter.

pub mod config;
pub mod scripts;
pub mod tester;

pub use config::TesterConfig;
pub use tester::{Tester, TesterError};
