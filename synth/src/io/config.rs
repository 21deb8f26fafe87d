//! Loop configuration stored as TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Synthesis loop configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to
/// usable values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SynthConfig {
    /// Upper bound on outer generate→compile→test attempts.
    pub max_retries: u32,

    /// Wall-clock budget for one compiler invocation, in seconds.
    pub compile_timeout_secs: u64,

    /// Wall-clock budget for one test execution, in seconds.
    pub test_timeout_secs: u64,

    /// Truncate subprocess stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    pub backend: BackendConfig,
}

/// Which generation protocol to speak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Ollama,
    Chat,
}

/// Generation backend settings, passed through to the HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// Base URL of the model server.
    pub server: String,

    /// Route appended to the server URL; empty selects the backend's default
    /// route.
    pub route: String,

    pub model: String,

    /// Bearer token for hosted chat servers; empty sends no auth header.
    pub api_key: String,

    /// HTTP timeout in seconds; owned by the client, not by the loop.
    pub timeout_secs: u64,

    /// Internal retry budget for replies without extractable code.
    /// Independent of `max_retries` on the outer loop.
    pub max_retries: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            compile_timeout_secs: 120,
            test_timeout_secs: 60,
            output_limit_bytes: 100_000,
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Ollama,
            server: "http://localhost:11434".to_string(),
            route: String::new(),
            model: "codellama".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            max_retries: 5,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(anyhow!("max_retries must be > 0"));
        }
        if self.compile_timeout_secs == 0 {
            return Err(anyhow!("compile_timeout_secs must be > 0"));
        }
        if self.test_timeout_secs == 0 {
            return Err(anyhow!("test_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.backend.server.trim().is_empty() {
            return Err(anyhow!("backend.server must not be empty"));
        }
        if self.backend.model.trim().is_empty() {
            return Err(anyhow!("backend.model must not be empty"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(anyhow!("backend.timeout_secs must be > 0"));
        }
        if self.backend.max_retries == 0 {
            return Err(anyhow!("backend.max_retries must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SynthConfig::default()`.
pub fn load_config(path: &Path) -> Result<SynthConfig> {
    if !path.exists() {
        let cfg = SynthConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SynthConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SynthConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
