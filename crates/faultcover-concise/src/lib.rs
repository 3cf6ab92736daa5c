//! Test set minimization: greedy set cover over a fault matrix.

pub mod cover;

pub use cover::{cover_indices, set_cover, CoverError};
