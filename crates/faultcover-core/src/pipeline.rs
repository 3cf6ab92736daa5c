//! The end-to-end run from a configuration file to a concise test set.

use std::collections::BTreeSet;
use std::path::Path;

use faultcover_concise::{set_cover, CoverError};
use faultcover_config::{read_config, ConfigError, ConfigFile};
use faultcover_gen::rng::{fresh_seed, generation_rng};
use faultcover_gen::{BaseSetGenerator, GenError};
use faultcover_ir::{TestCase, TestResults};
use faultcover_tester::{Tester, TesterConfig, TesterError};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("generation error: {0}")]
    Gen(#[from] GenError),

    #[error("tester error: {0}")]
    Tester(#[from] TesterError),

    #[error("minimization error: {0}")]
    Cover(#[from] CoverError),
}

/// Settings for base set generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for the random phase. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Draw budget for the random phase. `None` keeps the generator's default.
    pub max_attempts: Option<usize>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub fname: String,
    /// The seed actually used, so the run can be repeated.
    pub seed: u64,
    pub base_set: Vec<TestCase>,
    pub results: TestResults,
    pub concise: BTreeSet<TestCase>,
}

impl GenerationReport {
    /// The concise set as a Python list of argument lists.
    pub fn to_text(&self) -> String {
        let cases: Vec<String> = self.concise.iter().map(ToString::to_string).collect();
        format!("[{}]", cases.join(", "))
    }

    /// The concise set as a JSON array of arrays of argument literals.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let cases: Vec<Vec<String>> = self.concise.iter().map(TestCase::arg_literals).collect();
        serde_json::to_string_pretty(&cases)
    }
}

/// Build the base set for a parsed configuration. Returns the seed used
/// alongside the cases.
pub fn build_base_set(
    config: &ConfigFile,
    generation: &GenerationConfig,
) -> Result<(u64, Vec<TestCase>), GenError> {
    let seed = generation.seed.unwrap_or_else(fresh_seed);
    let mut generator = BaseSetGenerator::new(config.nodes.clone(), config.num_random);
    if let Some(max_attempts) = generation.max_attempts {
        generator = generator.with_max_attempts(max_attempts);
    }

    let mut rng = generation_rng(seed);
    let base_set = generator.base_set(&mut rng)?;
    Ok((seed, base_set))
}

/// Run the whole pipeline and return the concise set with its context.
pub fn generate_tests(
    config_path: impl AsRef<Path>,
    candidate_dir: impl AsRef<Path>,
    reference_path: impl AsRef<Path>,
    generation: &GenerationConfig,
    tester_config: &TesterConfig,
) -> Result<GenerationReport, PipelineError> {
    let config = read_config(config_path)?;
    info!(
        "testing `{}` with {} parameters, {} random cases",
        config.fname,
        config.nodes.len(),
        config.num_random
    );

    let (seed, base_set) = build_base_set(&config, generation)?;
    info!("base set: {} cases (seed {seed})", base_set.len());

    let tester = Tester::new(
        config.fname.clone(),
        reference_path.as_ref(),
        candidate_dir.as_ref(),
        base_set.clone(),
        tester_config.clone(),
    );
    tester.compute_expected_results()?;
    let results = tester.run_tests()?;

    let concise = set_cover(&results)?;
    info!(
        "concise set: {} of {} cases catch all {} faulty candidates",
        concise.len(),
        base_set.len(),
        results.fault_set().len()
    );

    Ok(GenerationReport {
        fname: config.fname,
        seed,
        base_set,
        results,
        concise,
    })
}
