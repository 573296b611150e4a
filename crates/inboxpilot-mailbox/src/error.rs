//! Mailbox error types.
//!
//! All mailbox operations surface errors through [`MailboxError`].  Each
//! variant carries enough context for callers to decide how to handle the
//! failure without inspecting opaque strings.

/// Unified error type for the mailbox client.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// An HTTP request could not be completed (connection, TLS, timeout).
    #[error("mailbox transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The mailbox API answered with a non-success status code.
    #[error("mailbox api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// A response body could not be decoded into the expected shape.
    #[error("mailbox response decode error: {reason}")]
    Decode { reason: String },

    /// A required field was absent from an otherwise valid response.
    #[error("missing field in mailbox response: {field}")]
    MissingField { field: String },
}

/// Convenience alias used throughout the mailbox crate.
pub type Result<T> = std::result::Result<T, MailboxError>;
