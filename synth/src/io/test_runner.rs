//! Test execution capability.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::registry::ArtifactRegistry;
use crate::core::report::{TestReport, parse_test_output};
use crate::io::params::RunParams;
use crate::io::process::run_command_with_timeout;

/// Abstraction over test execution engines.
pub trait TestRunner {
    /// Run the tests against the most recently registered artifact. Invoked
    /// repeatedly within one run as the registry grows.
    fn run(&self, registry: &ArtifactRegistry, params: &RunParams) -> Result<TestReport>;
}

/// Executes the latest registered test binary in its own process.
///
/// Process isolation means a fresh execution per invocation: no state
/// survives from earlier attempts, so a stale artifact can never shadow the
/// freshly compiled one.
pub struct ProcessTestRunner {
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl TestRunner for ProcessTestRunner {
    #[instrument(skip_all)]
    fn run(&self, registry: &ArtifactRegistry, params: &RunParams) -> Result<TestReport> {
        let name = params.test_stem();
        let artifact = registry
            .latest(&name)
            .ok_or_else(|| anyhow!("no compiled artifact registered for {name}"))?;

        let cmd = Command::new(&artifact.path);
        let output = run_command_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run test binary {}", artifact.path.display()))?;

        let report = parse_test_output(&output.combined("tests"));
        debug!(
            found = report.found,
            succeeded = report.succeeded,
            "test run parsed"
        );
        Ok(report)
    }
}
