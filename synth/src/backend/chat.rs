//! OpenAI-compatible chat backend.
//!
//! Speaks the `/v1/chat/completions` shape, which local servers and hosted
//! APIs both expose. Unlike the Ollama backend there is no conversation
//! context to thread; each request stands alone.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::backend::{Generator, synthesize};
use crate::core::candidate::Candidate;
use crate::core::feedback::Feedback;
use crate::io::config::BackendConfig;

const DEFAULT_ROUTE: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Reply from a chat completions route. Extra fields (id, usage, ...) are
/// ignored; only the first choice's message matters.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Generation backend speaking the OpenAI chat completions protocol.
pub struct ChatGenerator {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl ChatGenerator {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            config: config.clone(),
            client,
        })
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
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(url = %url, "requesting completion");
        let mut request = self.client.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }
        let response = request.send().with_context(|| format!("post {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("backend returned {status}: {}", text.trim());
        }
        let reply: ChatResponse = response.json().context("decode backend reply")?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("backend reply contained no choices"))?;
        Ok(choice.message.content)
    }
}

impl Generator for ChatGenerator {
    #[instrument(skip_all, fields(test_file = %test_file.display()))]
    fn generate(&self, test_file: &Path, feedback: &Feedback) -> Result<Candidate> {
        let test_source = fs::read_to_string(test_file)
            .with_context(|| format!("read test file {}", test_file.display()))?;
        synthesize(&test_source, feedback, self.config.max_retries, |prompt| {
            self.request_completion(prompt)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_chat_reply() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1736100000,
            "model": "gpt-4o-mini",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "```rust\npub fn add(a: i64, b: i64) -> i64 { a + b }\n```"
                    },
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        }"#;
        let reply: ChatResponse = serde_json::from_str(raw).expect("decode");
        assert_eq!(reply.choices.len(), 1);
        assert!(reply.choices[0].message.content.contains("pub fn add"));
    }

    #[test]
    fn an_empty_route_falls_back_to_the_chat_route() {
        let config = BackendConfig {
            server: "http://localhost:8089".to_string(),
            route: String::new(),
            ..BackendConfig::default()
        };
        let backend = ChatGenerator::new(&config).expect("backend");
        assert_eq!(
            backend.endpoint(),
            "http://localhost:8089/v1/chat/completions"
        );
    }

    #[test]
    fn encodes_a_single_user_message() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "write code",
            }],
        };
        let json = serde_json::to_string(&body).expect("encode");
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"write code\""));
    }
}
