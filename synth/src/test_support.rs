//! Test-only scripted collaborators and fixtures.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, anyhow};

use crate::backend::Generator;
use crate::core::candidate::Candidate;
use crate::core::feedback::Feedback;
use crate::core::registry::ArtifactRegistry;
use crate::core::report::{CompileOutcome, TestReport};
use crate::io::compiler::{CompileRequest, Compiler};
use crate::io::params::RunParams;
use crate::io::test_runner::TestRunner;

/// Deterministic candidate for the `adder` module fixture.
pub fn candidate(backend_attempts: u32) -> Candidate {
    Candidate {
        file_name: "adder.rs".to_string(),
        package: "adder".to_string(),
        content: "pub fn add(a: i64, b: i64) -> i64 {\n    a + b\n}\n".to_string(),
        backend_attempts,
    }
}

/// Write the `adder` test fixture into `dir` and build params writing to
/// `dir/out`.
pub fn adder_params(dir: &Path) -> Result<RunParams> {
    let test_file = dir.join("adder_test.rs");
    fs::write(
        &test_file,
        "mod adder;\n\n#[test]\nfn adds() {\n    assert_eq!(adder::add(2, 2), 4);\n}\n",
    )?;
    RunParams::build(&test_file, Some(&dir.join("out")))
}

/// Report where every discovered test passed.
pub fn passing_report(found: u32) -> TestReport {
    TestReport {
        found,
        succeeded: found,
        error_output: String::new(),
    }
}

/// Report where the run did not fully pass, carrying the given output.
pub fn failing_report(found: u32, succeeded: u32, error_output: &str) -> TestReport {
    TestReport {
        found,
        succeeded,
        error_output: error_output.to_string(),
    }
}

/// One scripted generation: a candidate or a transport failure.
pub enum ScriptedGeneration {
    Candidate(Candidate),
    TransportError(String),
}

/// Generator returning a predetermined script of results; records the
/// feedback observed on each call.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<ScriptedGeneration>>,
    calls: AtomicU32,
    feedback_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<ScriptedGeneration>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            feedback_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Feedback error text observed per call, in call order.
    pub fn feedback_seen(&self) -> Vec<Option<String>> {
        self.feedback_seen.lock().expect("feedback lock").clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, _test_file: &Path, feedback: &Feedback) -> Result<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feedback_seen
            .lock()
            .expect("feedback lock")
            .push(feedback.error().map(str::to_string));
        match self.script.lock().expect("script lock").pop_front() {
            Some(ScriptedGeneration::Candidate(candidate)) => Ok(candidate),
            Some(ScriptedGeneration::TransportError(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted generator exhausted")),
        }
    }
}

/// Compiler returning a predetermined script of outcomes.
pub struct ScriptedCompiler {
    script: Mutex<VecDeque<CompileOutcome>>,
    calls: AtomicU32,
}

impl ScriptedCompiler {
    pub fn new(script: Vec<CompileOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Compiler for ScriptedCompiler {
    fn compile(&self, _request: &CompileRequest) -> Result<CompileOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| anyhow!("scripted compiler exhausted"))
    }
}

/// Test runner returning a predetermined script of reports; records how many
/// artifacts were visible at each invocation.
pub struct ScriptedTestRunner {
    script: Mutex<VecDeque<TestReport>>,
    calls: AtomicU32,
    registry_sizes: Mutex<Vec<usize>>,
}

impl ScriptedTestRunner {
    pub fn new(script: Vec<TestReport>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            registry_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Registry size observed per call, in call order.
    pub fn registry_sizes(&self) -> Vec<usize> {
        self.registry_sizes.lock().expect("registry lock").clone()
    }
}

impl TestRunner for ScriptedTestRunner {
    fn run(&self, registry: &ArtifactRegistry, _params: &RunParams) -> Result<TestReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registry_sizes
            .lock()
            .expect("registry lock")
            .push(registry.len());
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| anyhow!("scripted test runner exhausted"))
    }
}
