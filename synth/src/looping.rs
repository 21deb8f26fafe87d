//! Multi-attempt synthesis loop.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::backend::Generator;
use crate::core::feedback::Feedback;
use crate::core::registry::ArtifactRegistry;
use crate::io::compiler::Compiler;
use crate::io::config::SynthConfig;
use crate::io::params::RunParams;
use crate::io::test_runner::TestRunner;
use crate::step::{StepLimits, StepVerdict, run_step};

/// Terminal result of a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Path of the passing candidate; `None` when no solution was found.
    pub solution_path: Option<PathBuf>,
    pub succeeded: bool,
    /// Outer attempts consumed, always `<= max_retries`.
    pub attempts_used: u32,
    /// Last persisted candidate, kept for reporting even on exhaustion.
    pub last_candidate: Option<PathBuf>,
}

/// Run the generate→compile→test loop until a candidate passes every test or
/// the retry budget is exhausted.
///
/// Feedback flows as a fold: each attempt consumes the previous attempt's
/// record and produces the next, starting from the empty record. Compile and
/// test failures drive another attempt; generator transport errors abort
/// immediately; exhaustion is a normal outcome, not an error.
pub fn run_loop<G: Generator + ?Sized, C: Compiler, T: TestRunner>(
    generator: &G,
    compiler: &C,
    test_runner: &T,
    params: &RunParams,
    config: &SynthConfig,
) -> Result<LoopOutcome> {
    let limits = StepLimits::from_config(config);
    // Artifact visibility starts empty for every run.
    let mut registry = ArtifactRegistry::new();
    let mut feedback = Feedback::none();
    let mut last_candidate = None;

    for attempt in 1..=config.max_retries {
        let step = run_step(
            generator,
            compiler,
            test_runner,
            &mut registry,
            params,
            &limits,
            &feedback,
            attempt,
        )?;
        last_candidate = Some(step.solution_path.clone());

        match step.verdict {
            StepVerdict::Solved => {
                info!(attempt, solution = %step.solution_path.display(), "solution found");
                return Ok(LoopOutcome {
                    solution_path: Some(step.solution_path),
                    succeeded: true,
                    attempts_used: attempt,
                    last_candidate,
                });
            }
            StepVerdict::CompileFailed { feedback: next }
            | StepVerdict::TestsFailed { feedback: next } => {
                debug!(attempt, "attempt failed");
                feedback = next;
            }
        }
    }

    info!(
        max_retries = config.max_retries,
        last_candidate = ?last_candidate,
        "no solution found"
    );
    Ok(LoopOutcome {
        solution_path: None,
        succeeded: false,
        attempts_used: config.max_retries,
        last_candidate,
    })
}
