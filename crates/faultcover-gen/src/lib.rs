//! Value generation: generator node trees and base test set assembly.

pub mod basegen;
pub mod node;
pub mod rng;

pub use basegen::{BaseSetGenerator, GenError};
pub use node::{DomainRole, GenNode, NodeError, NodeKind, Number};
