//! Generation backend error types.

/// Unified error type for the generation backend.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    /// An HTTP request to the provider failed or returned a non-success
    /// status.
    #[error("generation request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider response could not be parsed into generated text.
    #[error("generation response parse error: {reason}")]
    ParseFailed { reason: String },
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;
