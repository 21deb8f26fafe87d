//! Orchestration of a single generate→compile→test attempt.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::backend::Generator;
use crate::core::feedback::Feedback;
use crate::core::registry::ArtifactRegistry;
use crate::io::compiler::{CompileRequest, Compiler};
use crate::io::config::SynthConfig;
use crate::io::params::RunParams;
use crate::io::test_runner::TestRunner;
use crate::io::workspace::persist_candidate;

/// Limits threaded into one attempt's collaborator calls.
#[derive(Debug, Clone)]
pub struct StepLimits {
    pub compile_timeout: Duration,
    pub output_limit_bytes: usize,
}

impl StepLimits {
    pub fn from_config(config: &SynthConfig) -> Self {
        Self {
            compile_timeout: Duration::from_secs(config.compile_timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        }
    }
}

/// What a single attempt decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVerdict {
    /// Every discovered test passed.
    Solved,
    /// Compilation failed; tests were skipped this attempt.
    CompileFailed { feedback: Feedback },
    /// Tests ran but did not all pass, or none were discovered.
    TestsFailed { feedback: Feedback },
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// 1-indexed outer attempt number.
    pub attempt: u32,
    /// Where this attempt's candidate was persisted.
    pub solution_path: PathBuf,
    /// Internal retries the backend spent producing the candidate.
    pub backend_attempts: u32,
    pub verdict: StepVerdict,
}

/// Execute one attempt: generate a candidate, persist it together with a copy
/// of the test file, compile both, and run the tests when compilation
/// succeeds.
///
/// Generator errors abort the run. Compile and test failures become the
/// verdict's feedback; only one failure source feeds it per attempt, and
/// compile errors win because the tests never ran.
#[instrument(skip_all, fields(attempt = attempt))]
pub fn run_step<G: Generator + ?Sized, C: Compiler, T: TestRunner>(
    generator: &G,
    compiler: &C,
    test_runner: &T,
    registry: &mut ArtifactRegistry,
    params: &RunParams,
    limits: &StepLimits,
    feedback: &Feedback,
    attempt: u32,
) -> Result<StepOutcome> {
    info!(attempt, "external attempt");

    let candidate = generator.generate(&params.input_test_file, feedback)?;
    debug!(
        backend_attempts = candidate.backend_attempts,
        file_name = %candidate.file_name,
        "candidate received"
    );

    let persisted = persist_candidate(params, &candidate)?;

    let binary_name = format!("{}{}", params.test_stem(), std::env::consts::EXE_SUFFIX);
    let output_binary = persisted
        .test_path
        .parent()
        .map(|dir| dir.join(&binary_name))
        .unwrap_or_else(|| PathBuf::from(&binary_name));

    let compile = compiler.compile(&CompileRequest {
        solution_path: persisted.solution_path.clone(),
        test_path: persisted.test_path.clone(),
        output_binary: output_binary.clone(),
        timeout: limits.compile_timeout,
        output_limit_bytes: limits.output_limit_bytes,
    })?;
    if !compile.success {
        debug!("compilation failed");
        return Ok(StepOutcome {
            attempt,
            solution_path: persisted.solution_path,
            backend_attempts: candidate.backend_attempts,
            verdict: StepVerdict::CompileFailed {
                feedback: Feedback::from_failure(compile.errors),
            },
        });
    }

    registry.register(params.test_stem(), output_binary);

    let report = test_runner.run(registry, params)?;
    info!(
        found = report.found,
        succeeded = report.succeeded,
        "tests finished"
    );

    let verdict = if report.all_passed() {
        StepVerdict::Solved
    } else {
        StepVerdict::TestsFailed {
            feedback: Feedback::from_failure(report.error_output),
        }
    };

    Ok(StepOutcome {
        attempt,
        solution_path: persisted.solution_path,
        backend_attempts: candidate.backend_attempts,
        verdict,
    })
}
