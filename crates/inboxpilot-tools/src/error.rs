//! Tool surface error types.
//!
//! These are internal: by the time a result crosses the tool boundary every
//! operation-level error has been folded into an error envelope.  Only
//! protocol misuse (unknown tool, malformed parameters) surfaces as an
//! `Err` from `execute_tool`.

use inboxpilot_agent::AgentError;
use inboxpilot_mailbox::MailboxError;

/// Unified error type for the tool surface.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A collaborator was never initialized; every dependent operation
    /// fails fast with this.
    #[error("{service} not available")]
    ServiceUnavailable { service: String },

    /// The requested tool does not exist on this surface.
    #[error("tool not found: `{tool_name}` on surface `{surface_id}`")]
    ToolNotFound {
        surface_id: String,
        tool_name: String,
    },

    /// The parameters supplied to a tool are malformed.
    #[error("invalid parameters for tool `{tool_name}`: {reason}")]
    InvalidParams { tool_name: String, reason: String },

    /// A mailbox operation failed.
    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    /// The generation backend failed.
    #[error(transparent)]
    Generation(#[from] AgentError),

    /// A required value was missing from otherwise successful collaborator
    /// output (e.g. an empty profile address).
    #[error("validation failed: {reason}")]
    Validation { reason: String },
}

/// Convenience alias used throughout the tools crate.
pub type Result<T> = std::result::Result<T, ToolError>;
