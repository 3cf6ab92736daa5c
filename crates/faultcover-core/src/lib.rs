//! End-to-end test generation: parse a configuration, build the base set,
//! run it against the reference and the candidates, and minimize.

pub mod pipeline;

pub use pipeline::{
    build_base_set, generate_tests, GenerationConfig, GenerationReport, PipelineError,
};
