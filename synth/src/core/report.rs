//! Compile and test results consumed within one attempt.

use std::sync::LazyLock;

use regex::Regex;

/// Result of compiling one candidate together with its test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub success: bool,
    /// Compiler diagnostics; empty on success.
    pub errors: String,
}

impl CompileOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: String::new(),
        }
    }

    pub fn failed(errors: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: errors.into(),
        }
    }
}

/// Result of one test execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    /// Tests discovered and run.
    pub found: u32,
    /// Tests that passed.
    pub succeeded: u32,
    /// Captured output when the run did not fully pass; empty otherwise.
    pub error_output: String,
}

impl TestReport {
    /// A run passes only when at least one test was discovered and every one
    /// of them succeeded. Zero discovered tests is a failure, not a pass.
    pub fn all_passed(&self) -> bool {
        self.found > 0 && self.succeeded == self.found
    }
}

/// Parse a libtest summary (`X passed; Y failed`) out of raw process output.
///
/// Output with no recognizable summary maps to zero tests found, which the
/// loop treats as a failure carrying the raw output forward.
pub fn parse_test_output(raw: &str) -> TestReport {
    static SUMMARY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(\d+) passed; (\d+) failed").unwrap());

    let Some(caps) = SUMMARY_RE.captures(raw) else {
        return TestReport {
            found: 0,
            succeeded: 0,
            error_output: raw.to_string(),
        };
    };
    let passed: u32 = caps[1].parse().unwrap_or(0);
    let failed: u32 = caps[2].parse().unwrap_or(0);
    let report = TestReport {
        found: passed + failed,
        succeeded: passed,
        error_output: String::new(),
    };
    if report.all_passed() {
        report
    } else {
        TestReport {
            error_output: raw.to_string(),
            ..report
        }
    }
}
