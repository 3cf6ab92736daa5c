//! Configuration files: a JSON envelope around a compact type/domain grammar.

pub mod grammar;
pub mod parse;

pub use grammar::parse_node;
pub use parse::{parse_config, read_config, ConfigError, ConfigFile};
