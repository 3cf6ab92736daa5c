//! The JSON envelope of a configuration file and the errors it can raise.

use std::path::{Path, PathBuf};

use faultcover_gen::{GenNode, NodeError};
use serde::Deserialize;

use crate::grammar::parse_node;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "{types} types but {exhaustive} exhaustive domains and {random} random domains"
    )]
    LengthMismatch {
        types: usize,
        exhaustive: usize,
        random: usize,
    },

    #[error("num random must be non-negative, got {0}")]
    NegativeNumRandom(i64),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("expected '{separator}' in '{text}'")]
    MissingSeparator { separator: char, text: String },

    #[error("malformed domain '{0}'")]
    MalformedDomain(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("range upper bound {upper} is below lower bound {lower}")]
    ReversedRange { lower: i64, upper: i64 },

    #[error("range {lower}~{upper} has more than {max} entries")]
    RangeTooWide { lower: i64, upper: i64, max: u64 },

    #[error("container size {0} is negative")]
    NegativeSize(i64),

    #[error("bool domain entries must be 0 or 1, got {0}")]
    InvalidBool(i64),

    #[error("{container} elements of type {element} are not hashable")]
    Unhashable {
        container: &'static str,
        element: String,
    },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// The JSON envelope as written on disk.
#[derive(Debug, Deserialize)]
struct RawConfig {
    fname: String,
    types: Vec<String>,
    #[serde(rename = "exhaustive domain")]
    exhaustive_domain: Vec<String>,
    #[serde(rename = "random domain")]
    random_domain: Vec<String>,
    #[serde(rename = "num random")]
    num_random: i64,
}

/// A parsed configuration: the function under test, one generator node per
/// parameter, and how many random cases to add to the base set.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub fname: String,
    pub nodes: Vec<GenNode>,
    pub num_random: usize,
}

pub fn parse_config(text: &str) -> Result<ConfigFile, ConfigError> {
    let raw: RawConfig = serde_json::from_str(text)?;

    if raw.num_random < 0 {
        return Err(ConfigError::NegativeNumRandom(raw.num_random));
    }
    if raw.types.len() != raw.exhaustive_domain.len() || raw.types.len() != raw.random_domain.len()
    {
        return Err(ConfigError::LengthMismatch {
            types: raw.types.len(),
            exhaustive: raw.exhaustive_domain.len(),
            random: raw.random_domain.len(),
        });
    }

    let nodes = raw
        .types
        .iter()
        .zip(&raw.exhaustive_domain)
        .zip(&raw.random_domain)
        .map(|((ty, ex), ran)| parse_node(ty, ex, ran))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConfigFile {
        fname: raw.fname,
        nodes,
        num_random: raw.num_random as usize,
    })
}

pub fn read_config(path: impl AsRef<Path>) -> Result<ConfigFile, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}
