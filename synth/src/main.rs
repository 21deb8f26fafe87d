//! Test-driven code synthesis CLI.
//!
//! Takes a test file, asks the generation backend for candidate solutions,
//! and loops compile→test→feedback until the tests pass or the retry budget
//! runs out.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use synth::backend::Generator;
use synth::backend::chat::ChatGenerator;
use synth::backend::ollama::OllamaGenerator;
use synth::exit_codes;
use synth::io::compiler::RustcCompiler;
use synth::io::config::{BackendKind, load_config};
use synth::io::params::RunParams;
use synth::io::test_runner::ProcessTestRunner;
use synth::logging;
use synth::looping::run_loop;

#[derive(Parser)]
#[command(name = "synth", version, about = "Test-driven code synthesis loop")]
struct Cli {
    /// Test file specifying the solution to synthesize.
    test_file: PathBuf,

    /// Where generated sources and compiled artifacts are written.
    /// Defaults to a fresh directory under the system temp dir.
    output_dir: Option<PathBuf>,

    /// Configuration file (TOML).
    #[arg(long, default_value = "synth.toml")]
    config: PathBuf,

    /// Override the configured outer retry budget.
    #[arg(long)]
    max_retries: Option<u32>,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
        config.validate()?;
    }

    let params = RunParams::build(&cli.test_file, cli.output_dir.as_deref())?;
    let generator: Box<dyn Generator> = match config.backend.kind {
        BackendKind::Ollama => {
            Box::new(OllamaGenerator::new(&config.backend).context("build generation backend")?)
        }
        BackendKind::Chat => {
            Box::new(ChatGenerator::new(&config.backend).context("build generation backend")?)
        }
    };
    let compiler = RustcCompiler;
    let test_runner = ProcessTestRunner {
        timeout: Duration::from_secs(config.test_timeout_secs),
        output_limit_bytes: config.output_limit_bytes,
    };

    let outcome = run_loop(generator.as_ref(), &compiler, &test_runner, &params, &config)?;
    match &outcome.solution_path {
        Some(solution) => {
            println!(
                "solution found: {} (attempts: {})",
                solution.display(),
                outcome.attempts_used
            );
            Ok(exit_codes::SOLVED)
        }
        None => {
            println!("no solution found after {} attempts", outcome.attempts_used);
            Ok(exit_codes::EXHAUSTED)
        }
    }
}
