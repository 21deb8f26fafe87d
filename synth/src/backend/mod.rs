//! Generation backends consumed by the synthesis loop.
//!
//! The [`Generator`] trait decouples the loop from the concrete model
//! backend (Ollama or an OpenAI-compatible chat server). Tests use scripted
//! generators that return predetermined candidates without touching the
//! network.

pub mod chat;
pub mod ollama;
pub mod prompt;

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use tracing::{info, warn};

use crate::backend::prompt::render_prompt;
use crate::core::candidate::Candidate;
use crate::core::feedback::Feedback;

/// Abstraction over code-generation backends.
pub trait Generator {
    /// Produce a candidate solution for the given test file, folding the
    /// previous attempt's feedback into the request when present.
    ///
    /// Errors are transport-level (unreachable backend, malformed reply) and
    /// abort the whole run; code-quality failures never surface here.
    fn generate(&self, test_file: &Path, feedback: &Feedback) -> Result<Candidate>;
}

/// Drive prompt rendering and the bounded internal retry against a transport
/// function. Shared by the concrete backends and separated from their HTTP
/// plumbing so retry behavior is testable without a server.
pub(crate) fn synthesize<F>(
    test_source: &str,
    feedback: &Feedback,
    max_attempts: u32,
    mut request: F,
) -> Result<Candidate>
where
    F: FnMut(&str) -> Result<String>,
{
    let (package, file_name) = solution_target(test_source)?;
    let prompt = render_prompt(test_source, feedback)?;

    let mut attempts = 0;
    loop {
        attempts += 1;
        let reply = request(&prompt)?;
        match extract_fenced_block(&reply) {
            Some(content) => {
                info!(backend_attempts = attempts, file_name = %file_name, "candidate produced");
                return Ok(Candidate {
                    file_name,
                    package,
                    content,
                    backend_attempts: attempts,
                });
            }
            None if attempts < max_attempts => {
                warn!(attempts, "reply contained no code block, retrying");
            }
            None => bail!("backend produced no code block after {attempts} attempts"),
        }
    }
}

/// Derive the solution module's package and file name from the test file's
/// `mod` declaration.
fn solution_target(test_source: &str) -> Result<(String, String)> {
    static MOD_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\s*(?:pub\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)\s*;").unwrap()
    });
    let caps = MOD_RE
        .captures(test_source)
        .ok_or_else(|| anyhow!("test file declares no `mod <name>;` naming the solution module"))?;
    let module = caps[1].to_string();
    let file_name = format!("{module}.rs");
    Ok((module, file_name))
}

/// First fenced code block in a reply, fences and language tag stripped.
fn extract_fenced_block(reply: &str) -> Option<String> {
    let start = reply.find("```")?;
    let after_fence = &reply[start + 3..];
    // Anything on the fence line itself is a language tag, dropped.
    let newline = after_fence.find('\n')?;
    let body = &after_fence[newline + 1..];
    let end = body.find("```")?;
    let block = body[..end].trim_end();
    if block.trim().is_empty() {
        None
    } else {
        Some(format!("{block}\n"))
    }
}
