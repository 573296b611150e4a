//! Multi-provider LLM client.
//!
//! Supports the **Anthropic Messages API** and the **OpenAI Chat Completions
//! API** (including OpenAI-compatible endpoints such as Ollama, Together,
//! and vLLM), non-streaming.  The assistant only needs single-turn
//! prompt-to-text completion, exposed through the [`TextGenerator`] trait.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{AgentError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Anthropic API base URL.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default maximum tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The seam between the assistant and the generation backend.
///
/// Implementations turn a prompt into generated text; tests substitute mocks
/// here to prove the assistant never calls the backend when it must not.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Provider and configuration
// ---------------------------------------------------------------------------

/// Identifies which LLM provider the client should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI Chat Completions API (also covers OpenAI-compatible endpoints).
    OpenAI,
}

/// Configuration for connecting to a single LLM provider endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Which provider this configuration targets.
    pub provider: LlmProvider,
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (e.g. `https://api.anthropic.com`).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
}

impl LlmClientConfig {
    /// Create a configuration for the Anthropic Claude API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_owned(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create a configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create a configuration for any OpenAI-compatible API (e.g. Ollama,
    /// Together, vLLM).
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Non-streaming LLM client for single-turn completions.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmClientConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            let provider = match config.provider {
                LlmProvider::Anthropic => "anthropic",
                LlmProvider::OpenAI => "openai",
            };
            return Err(AgentError::MissingApiKey {
                provider: provider.into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AgentError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// The configured provider.
    pub fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| {
                AgentError::RequestFailed {
                    reason: format!("invalid API key header: {e}"),
                }
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(url = %url, model = %self.config.model, provider = "anthropic", "sending generation request");

        let response = self.send(&url, headers, &body).await?;
        parse_anthropic_text(&response)
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key)).map_err(|e| {
                AgentError::RequestFailed {
                    reason: format!("invalid authorization header: {e}"),
                }
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(url = %url, model = %self.config.model, provider = "openai", "sending generation request");

        let response = self.send(&url, headers, &body).await?;
        parse_openai_text(&response)
    }

    /// POST the request body and decode the JSON response, mapping HTTP
    /// failures to typed errors.
    async fn send(&self, url: &str, headers: HeaderMap, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::RequestFailed {
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(AgentError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        serde_json::from_str(&text).map_err(|e| AgentError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.config.provider {
            LlmProvider::Anthropic => self.complete_anthropic(prompt).await,
            LlmProvider::OpenAI => self.complete_openai(prompt).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing (free functions, testable)
// ---------------------------------------------------------------------------

/// Extract the generated text from an Anthropic Messages API response.
pub fn parse_anthropic_text(v: &Value) -> Result<String> {
    let content = v["content"]
        .as_array()
        .ok_or_else(|| AgentError::ParseFailed {
            reason: "missing `content` array in response".into(),
        })?;

    let text: String = content
        .iter()
        .filter(|block| block["type"].as_str() == Some("text"))
        .filter_map(|block| block["text"].as_str())
        .collect();

    Ok(text)
}

/// Extract the generated text from an OpenAI Chat Completions response.
pub fn parse_openai_text(v: &Value) -> Result<String> {
    let message = &v["choices"][0]["message"];
    if message.is_null() {
        return Err(AgentError::ParseFailed {
            reason: "missing `choices[0].message` in response".into(),
        });
    }
    Ok(message["content"].as_str().unwrap_or_default().to_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Configuration --

    #[test]
    fn anthropic_config_uses_default_endpoint() {
        let config = LlmClientConfig::anthropic("key", "claude-sonnet-4-20250514");
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert_eq!(config.base_url, ANTHROPIC_BASE_URL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn openai_compatible_config_keeps_custom_base_url() {
        let config = LlmClientConfig::openai_compatible("key", "llama3", "http://localhost:11434/v1");
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn new_rejects_empty_api_key() {
        let config = LlmClientConfig::openai("", "gpt-4o-mini");
        let err = LlmClient::new(config).unwrap_err();
        assert!(matches!(err, AgentError::MissingApiKey { .. }));
    }

    // -- Anthropic parsing --

    #[test]
    fn parse_anthropic_text_joins_text_blocks() {
        let v = json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ]
        });
        assert_eq!(parse_anthropic_text(&v).unwrap(), "Hello world");
    }

    #[test]
    fn parse_anthropic_text_ignores_non_text_blocks() {
        let v = json!({
            "content": [
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "answer"}
            ]
        });
        assert_eq!(parse_anthropic_text(&v).unwrap(), "answer");
    }

    #[test]
    fn parse_anthropic_text_missing_content_fails() {
        let v = json!({"id": "msg_1"});
        assert!(matches!(
            parse_anthropic_text(&v),
            Err(AgentError::ParseFailed { .. })
        ));
    }

    // -- OpenAI parsing --

    #[test]
    fn parse_openai_text_reads_first_choice() {
        let v = json!({
            "choices": [{"message": {"role": "assistant", "content": "answer"}}]
        });
        assert_eq!(parse_openai_text(&v).unwrap(), "answer");
    }

    #[test]
    fn parse_openai_text_missing_choices_fails() {
        let v = json!({"id": "cmpl-1"});
        assert!(matches!(
            parse_openai_text(&v),
            Err(AgentError::ParseFailed { .. })
        ));
    }

    #[test]
    fn parse_openai_text_null_content_is_empty() {
        let v = json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        });
        assert_eq!(parse_openai_text(&v).unwrap(), "");
    }
}
