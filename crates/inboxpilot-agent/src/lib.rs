//! Text-generation backend for Inboxpilot.
//!
//! The assistant treats generation as a black box behind the
//! [`TextGenerator`] trait: a prompt goes in, text comes out, and any
//! backend failure surfaces as a typed [`AgentError`].  [`llm::LlmClient`]
//! implements the trait against the Anthropic Messages API or any
//! OpenAI-compatible Chat Completions endpoint.  [`prompts`] holds the
//! deterministic prompt builders for summarization and reply drafting.

pub mod error;
pub mod llm;
pub mod prompts;

pub use error::{AgentError, Result};
pub use llm::{LlmClient, LlmClientConfig, LlmProvider, TextGenerator};
pub use prompts::{reply_prompt, summary_prompt};
