//! Runs a base test set against a reference and a directory of candidates.
//!
//! Every (case, program) pair is a separate interpreter process, so a
//! candidate that crashes or corrupts its own state only fails that case.
//! A candidate run passes when the last line it prints is `True`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use faultcover_ir::{ResultsError, TestCase, TestResults};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::TesterConfig;
use crate::scripts::{
    expected_source, EXPECTED_FILE, GENERATED_FILES, RUNNER_FILE, RUNNER_SOURCE, WRAPPER_FILE,
    WRAPPER_SOURCE,
};

#[derive(Debug, thiserror::Error)]
pub enum TesterError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start interpreter `{python}`: {source}")]
    Spawn {
        python: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no candidate .py files in {0}")]
    NoCandidates(PathBuf),

    #[error("reference failed on case {index} {case}: {stderr}")]
    ReferenceFailed {
        index: usize,
        case: String,
        stderr: String,
    },

    #[error("{path} is missing; compute the expected results first")]
    MissingExpected { path: PathBuf },

    #[error(transparent)]
    Results(#[from] ResultsError),
}

/// Executes test cases through a Python interpreter.
#[derive(Debug, Clone)]
pub struct Tester {
    fname: String,
    reference: PathBuf,
    candidate_dir: PathBuf,
    cases: Vec<TestCase>,
    config: TesterConfig,
}

impl Tester {
    pub fn new(
        fname: impl Into<String>,
        reference: impl Into<PathBuf>,
        candidate_dir: impl Into<PathBuf>,
        cases: Vec<TestCase>,
        config: TesterConfig,
    ) -> Self {
        Self {
            fname: fname.into(),
            reference: reference.into(),
            candidate_dir: candidate_dir.into(),
            cases,
            config,
        }
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// Candidate file names in index order: the sorted `.py` files of the
    /// candidate directory, minus the generated scripts and the reference.
    pub fn candidates(&self) -> Result<Vec<String>, TesterError> {
        let entries = fs::read_dir(&self.candidate_dir).map_err(|e| self.io(&self.candidate_dir, e))?;
        let reference = fs::canonicalize(&self.reference).ok();

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io(&self.candidate_dir, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".py") || GENERATED_FILES.contains(&name) || !path.is_file() {
                continue;
            }
            if reference.is_some() && fs::canonicalize(&path).ok() == reference {
                continue;
            }
            names.push(name.to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Run every case on the reference, cache the results in `expected.py`
    /// and return them as Python literals.
    pub fn compute_expected_results(&self) -> Result<Vec<String>, TesterError> {
        let runner = self.candidate_dir.join(RUNNER_FILE);
        fs::write(&runner, RUNNER_SOURCE).map_err(|e| self.io(&runner, e))?;

        let results = self.map_cases(|index, case| {
            let mut cmd = Command::new(&self.config.python);
            cmd.arg(&runner)
                .arg(&self.reference)
                .arg(&self.fname)
                .args(case.arg_literals());
            let output = self.run(cmd)?;
            match output {
                Ok(line) if !line.is_empty() => Ok(line),
                Ok(_) => Err(TesterError::ReferenceFailed {
                    index,
                    case: case.to_string(),
                    stderr: "no output".to_string(),
                }),
                Err(stderr) => Err(TesterError::ReferenceFailed {
                    index,
                    case: case.to_string(),
                    stderr,
                }),
            }
        })?;

        let expected = self.candidate_dir.join(EXPECTED_FILE);
        fs::write(&expected, expected_source(&results)).map_err(|e| self.io(&expected, e))?;
        info!("computed {} expected results from {}", results.len(), self.reference.display());
        Ok(results)
    }

    /// Run every case on every candidate and record which cases catch
    /// which candidates.
    pub fn run_tests(&self) -> Result<TestResults, TesterError> {
        let expected = self.candidate_dir.join(EXPECTED_FILE);
        if !expected.is_file() {
            return Err(TesterError::MissingExpected { path: expected });
        }
        let wrapper = self.candidate_dir.join(WRAPPER_FILE);
        fs::write(&wrapper, WRAPPER_SOURCE).map_err(|e| self.io(&wrapper, e))?;

        let candidates = self.candidates()?;
        if candidates.is_empty() {
            return Err(TesterError::NoCandidates(self.candidate_dir.clone()));
        }

        let mut case_to_faults = vec![BTreeSet::new(); self.cases.len()];
        for (candidate_index, candidate) in candidates.iter().enumerate() {
            let passed = self.map_cases(|index, case| {
                let mut cmd = Command::new(&self.config.python);
                cmd.arg(&wrapper)
                    .arg(index.to_string())
                    .arg(candidate)
                    .arg(&self.fname)
                    .args(case.arg_literals());
                Ok(matches!(self.run(cmd)?, Ok(line) if line == "True"))
            })?;

            let mut caught = 0usize;
            for (faults, passed) in case_to_faults.iter_mut().zip(passed) {
                if !passed {
                    faults.insert(candidate_index);
                    caught += 1;
                }
            }
            debug!("candidate {candidate_index} ({candidate}): caught by {caught} cases");
        }

        if self.config.clean_cache {
            self.clean_cache()?;
        }

        let results = TestResults::from_coverage(self.cases.clone(), case_to_faults)?;
        info!(
            "{} of {} candidates caught by the base set",
            results.fault_set().len(),
            candidates.len()
        );
        Ok(results)
    }

    /// Delete `.pyc` files from the candidate directory's `__pycache__`.
    pub fn clean_cache(&self) -> Result<(), TesterError> {
        let cache = self.candidate_dir.join("__pycache__");
        let Ok(entries) = fs::read_dir(&cache) else {
            return Ok(());
        };
        for entry in entries {
            let path = entry.map_err(|e| self.io(&cache, e))?.path();
            if path.extension().is_some_and(|ext| ext == "pyc") {
                fs::remove_file(&path).map_err(|e| self.io(&path, e))?;
            }
        }
        Ok(())
    }

    fn map_cases<T, F>(&self, f: F) -> Result<Vec<T>, TesterError>
    where
        T: Send,
        F: Fn(usize, &TestCase) -> Result<T, TesterError> + Sync,
    {
        if self.config.parallel {
            self.cases
                .par_iter()
                .enumerate()
                .map(|(index, case)| f(index, case))
                .collect()
        } else {
            self.cases
                .iter()
                .enumerate()
                .map(|(index, case)| f(index, case))
                .collect()
        }
    }

    /// Run one interpreter process. The inner result is the last stdout
    /// line on success, or stderr when the process exited with an error.
    fn run(&self, mut cmd: Command) -> Result<Result<String, String>, TesterError> {
        let output = cmd.output().map_err(|source| TesterError::Spawn {
            python: self.config.python.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            let last = stdout.lines().last().unwrap_or("").to_string();
            Ok(Ok(last))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let summary = stderr.lines().last().unwrap_or("").trim().to_string();
            if summary.is_empty() {
                warn!("interpreter exited with {} and no stderr", output.status);
            }
            Ok(Err(summary))
        }
    }

    fn io(&self, path: &Path, source: std::io::Error) -> TesterError {
        TesterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
