//! Configuration loading.
//!
//! Settings come from a TOML file (default `inboxpilot.toml`), with secrets
//! always resolved through environment variables — the file names the
//! variable, never the value.  A missing file falls back to defaults so the
//! binary can run purely on environment configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Default environment variable holding the mailbox access token.
const DEFAULT_TOKEN_ENV: &str = "MAILBOX_ACCESS_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Mailbox service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailboxConfig {
    /// Override the API base URL (mock servers, proxies).
    pub base_url: Option<String>,
    /// Environment variable holding the pre-established access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token_env: default_token_env(),
        }
    }
}

/// Generation backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// `anthropic` or `openai` (covers OpenAI-compatible endpoints).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.  Defaults per provider:
    /// `ANTHROPIC_API_KEY` or `OPENAI_API_KEY`.
    pub api_key_env: Option<String>,
    /// Override the API base URL (Ollama, Together, vLLM, ...).
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// The environment variable the API key is read from.
    pub fn api_key_env(&self) -> &str {
        if let Some(env) = &self.api_key_env {
            return env;
        }
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "ANTHROPIC_API_KEY",
        }
    }
}

/// Assistant behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Default number of emails for `list` when no count is given.
    #[serde(default = "default_list_count")]
    pub default_list_count: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_list_count: default_list_count(),
        }
    }
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_list_count() -> u32 {
    10
}

impl Config {
    /// Load from a TOML file, or fall back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file absent; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
