//! Ollama generation backend over HTTP.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::backend::{Generator, synthesize};
use crate::core::candidate::Candidate;
use crate::core::feedback::Feedback;
use crate::io::config::BackendConfig;

const DEFAULT_ROUTE: &str = "/api/generate";

/// Request body for the Ollama generate route.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a [i64]>,
}

/// Reply from the Ollama generate route.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    /// Conversation state tokens, echoed back on the next request.
    #[serde(default)]
    context: Vec<i64>,
}

/// Generation backend speaking the Ollama generate protocol.
///
/// Keeps the server's conversation context between calls so retry prompts
/// build on the same session.
pub struct OllamaGenerator {
    config: BackendConfig,
    client: reqwest::blocking::Client,
    context: Mutex<Vec<i64>>,
}

impl OllamaGenerator {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            config: config.clone(),
            client,
            context: Mutex::new(Vec::new()),
        })
    }

    /// Conversation tokens retained from the most recent reply.
    pub fn context_tokens(&self) -> Vec<i64> {
        self.context
            .lock()
            .map(|held| held.clone())
            .unwrap_or_default()
    }

    fn endpoint(&self) -> String {
        let route = if self.config.route.is_empty() {
            DEFAULT_ROUTE
        } else {
            &self.config.route
        };
        format!("{}{}", self.config.server, route)
    }

    fn request_completion(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        let held = self.context_tokens();
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            context: if held.is_empty() { None } else { Some(&held) },
        };

        debug!(url = %url, "requesting completion");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .with_context(|| format!("post {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("backend returned {status}: {}", text.trim());
        }
        let reply: GenerateResponse = response.json().context("decode backend reply")?;

        if let Ok(mut held) = self.context.lock() {
            *held = reply.context;
        }
        Ok(reply.response)
    }
}

impl Generator for OllamaGenerator {
    #[instrument(skip_all, fields(test_file = %test_file.display()))]
    fn generate(&self, test_file: &Path, feedback: &Feedback) -> Result<Candidate> {
        let test_source = fs::read_to_string(test_file)
            .with_context(|| format!("read test file {}", test_file.display()))?;
        synthesize(&test_source, feedback, self.config.max_retries, |prompt| {
            self.request_completion(prompt)
        })
    }
}
