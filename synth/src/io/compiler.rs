//! Compilation capability.
//!
//! The [`Compiler`] trait decouples the loop from the concrete toolchain.
//! Tests use scripted compilers that return predetermined outcomes without
//! spawning processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::report::CompileOutcome;
use crate::io::process::run_command_with_timeout;

/// Files and limits for one compile invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Persisted candidate module.
    pub solution_path: PathBuf,
    /// Copy of the input test file, sibling to the candidate.
    pub test_path: PathBuf,
    /// Where the compiled test binary is written.
    pub output_binary: PathBuf,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

/// Abstraction over compiler backends.
///
/// Pure given the files on disk: the same inputs always yield the same
/// outcome. Retry decisions live in the orchestration loop, never here.
pub trait Compiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutcome>;
}

/// Compiles the copied test file with `rustc --test`.
///
/// The candidate resolves as a sibling `mod` of the test file, so compiling
/// the test pulls the candidate in; the result is one libtest binary.
pub struct RustcCompiler;

impl Compiler for RustcCompiler {
    #[instrument(skip_all, fields(test = %request.test_path.display()))]
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutcome> {
        let mut cmd = Command::new("rustc");
        cmd.arg("--edition")
            .arg("2021")
            .arg("--test")
            .arg(&request.test_path)
            .arg("-o")
            .arg(&request.output_binary);

        let output = run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .context("run rustc")?;

        if output.timed_out || !output.status.success() {
            return Ok(CompileOutcome::failed(output.combined("rustc")));
        }
        debug!(binary = %request.output_binary.display(), "compile succeeded");
        Ok(CompileOutcome::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::Candidate;
    use crate::io::workspace::persist_candidate;
    use crate::test_support::adder_params;

    fn request(solution: PathBuf, test: PathBuf, binary: PathBuf) -> CompileRequest {
        CompileRequest {
            solution_path: solution,
            test_path: test,
            output_binary: binary,
            timeout: Duration::from_secs(60),
            output_limit_bytes: 100_000,
        }
    }

    #[test]
    fn compiles_a_valid_candidate_with_its_test() {
        let temp = tempfile::tempdir().expect("tempdir");
        let params = adder_params(temp.path()).expect("params");
        let persisted = persist_candidate(&params, &crate::test_support::candidate(1))
            .expect("persist");

        let binary = persisted.test_path.with_file_name("adder_test_bin");
        let outcome = RustcCompiler
            .compile(&request(
                persisted.solution_path,
                persisted.test_path,
                binary.clone(),
            ))
            .expect("compile");

        assert!(outcome.success, "diagnostics: {}", outcome.errors);
        assert!(binary.is_file());
    }

    #[test]
    fn reports_diagnostics_for_a_broken_candidate() {
        let temp = tempfile::tempdir().expect("tempdir");
        let params = adder_params(temp.path()).expect("params");
        let broken = Candidate {
            content: "pub fn add(a: i64, b: i64) -> i64 {\n".to_string(),
            ..crate::test_support::candidate(1)
        };
        let persisted = persist_candidate(&params, &broken).expect("persist");

        let binary = persisted.test_path.with_file_name("adder_test_bin");
        let outcome = RustcCompiler
            .compile(&request(persisted.solution_path, persisted.test_path, binary))
            .expect("compile");

        assert!(!outcome.success);
        assert!(outcome.errors.contains("error"));
    }
}
