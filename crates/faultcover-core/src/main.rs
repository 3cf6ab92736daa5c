use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use faultcover_core::{generate_tests, GenerationConfig};
use faultcover_tester::TesterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "faultcover")]
#[command(about = "Generate a small Python test set that catches every faulty candidate")]
struct Args {
    /// JSON configuration describing the function's parameters.
    config: PathBuf,

    /// Directory of candidate implementations (`*.py`).
    candidate_dir: PathBuf,

    /// Trusted reference implementation.
    reference: PathBuf,

    /// Seed for the random phase; a fresh one is drawn and logged if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum random draws before giving up on finding new cases.
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Python interpreter used to run the reference and the candidates.
    #[arg(long, default_value = "python3")]
    python: String,

    /// Run interpreter processes one at a time.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Leave `.pyc` files in the candidate directory's `__pycache__`.
    #[arg(long, default_value_t = false)]
    keep_cache: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let generation = GenerationConfig {
        seed: args.seed,
        max_attempts: args.max_attempts,
    };
    let tester = TesterConfig {
        python: args.python,
        parallel: !args.sequential,
        clean_cache: !args.keep_cache,
    };

    let report = generate_tests(
        &args.config,
        &args.candidate_dir,
        &args.reference,
        &generation,
        &tester,
    )
    .with_context(|| format!("generating tests from {}", args.config.display()))?;

    match args.format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
