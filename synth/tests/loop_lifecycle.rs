//! Loop-level harness tests for full synthesis lifecycle scenarios.
//!
//! These drive `run_loop` with a scripted generator but the real `rustc`
//! compiler and process test runner, verifying end-to-end behavior: candidate
//! persistence, compile feedback, test feedback, and termination.

use std::fs;
use std::time::Duration;

use synth::core::candidate::Candidate;
use synth::io::compiler::RustcCompiler;
use synth::io::config::SynthConfig;
use synth::io::test_runner::ProcessTestRunner;
use synth::looping::run_loop;
use synth::test_support::{ScriptedGeneration, ScriptedGenerator, adder_params, candidate};

fn test_runner() -> ProcessTestRunner {
    ProcessTestRunner {
        timeout: Duration::from_secs(30),
        output_limit_bytes: 100_000,
    }
}

fn broken_candidate() -> Candidate {
    Candidate {
        content: "pub fn add(a: i64, b: i64) -> i64 {\n".to_string(),
        ..candidate(1)
    }
}

fn wrong_candidate() -> Candidate {
    Candidate {
        content: "pub fn add(a: i64, b: i64) -> i64 {\n    a - b\n}\n".to_string(),
        ..candidate(1)
    }
}

/// Full lifecycle: a candidate that fails to compile, then one that compiles
/// but fails the test, then a correct one.
///
/// Attempt sequence:
/// 1. Broken source → rustc diagnostics become the next feedback.
/// 2. Wrong arithmetic → libtest failure output becomes the next feedback.
/// 3. Correct module → success.
#[test]
fn recovers_from_compile_and_test_failures() {
    let temp = tempfile::tempdir().expect("tempdir");
    let params = adder_params(temp.path()).expect("params");
    let generator = ScriptedGenerator::new(vec![
        ScriptedGeneration::Candidate(broken_candidate()),
        ScriptedGeneration::Candidate(wrong_candidate()),
        ScriptedGeneration::Candidate(candidate(1)),
    ]);

    let outcome = run_loop(
        &generator,
        &RustcCompiler,
        &test_runner(),
        &params,
        &SynthConfig::default(),
    )
    .expect("loop");

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts_used, 3);

    let solution = outcome.solution_path.expect("solution path");
    let content = fs::read_to_string(&solution).expect("read solution");
    assert!(content.contains("a + b"));

    // The second attempt saw compiler diagnostics, the third saw the libtest
    // failure; each derived solely from the attempt before it.
    let seen = generator.feedback_seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], None);
    let compile_feedback = seen[1].as_deref().expect("compile feedback");
    assert!(compile_feedback.contains("error"), "got: {compile_feedback}");
    let test_feedback = seen[2].as_deref().expect("test feedback");
    assert!(test_feedback.contains("FAILED"), "got: {test_feedback}");
}

/// A correct first candidate ends the run after one attempt, with the
/// persisted solution and test copy sitting under the package directory.
#[test]
fn solves_on_the_first_attempt_when_the_candidate_is_correct() {
    let temp = tempfile::tempdir().expect("tempdir");
    let params = adder_params(temp.path()).expect("params");
    let generator = ScriptedGenerator::new(vec![ScriptedGeneration::Candidate(candidate(1))]);

    let outcome = run_loop(
        &generator,
        &RustcCompiler,
        &test_runner(),
        &params,
        &SynthConfig::default(),
    )
    .expect("loop");

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts_used, 1);

    let package_dir = params.output_directory.join("adder");
    assert!(package_dir.join("adder.rs").is_file());
    assert!(package_dir.join("adder_test.rs").is_file());
}

/// A wrong candidate on every attempt exhausts the budget; the outcome is a
/// normal no-solution result, not an error, and the last candidate is kept
/// for reporting.
#[test]
fn exhausts_the_budget_when_no_candidate_passes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let params = adder_params(temp.path()).expect("params");
    let config = SynthConfig {
        max_retries: 2,
        ..SynthConfig::default()
    };
    let generator = ScriptedGenerator::new(vec![
        ScriptedGeneration::Candidate(wrong_candidate()),
        ScriptedGeneration::Candidate(wrong_candidate()),
    ]);

    let outcome = run_loop(&generator, &RustcCompiler, &test_runner(), &params, &config)
        .expect("loop");

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts_used, 2);
    assert_eq!(outcome.solution_path, None);
    assert!(outcome.last_candidate.expect("last candidate").is_file());
}
