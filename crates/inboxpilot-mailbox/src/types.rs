//! Wire types for the mailbox REST API.
//!
//! These mirror the JSON shapes the service returns.  Message and thread ids
//! are opaque strings assigned by the mailbox; nothing here interprets them.

use serde::{Deserialize, Serialize};

/// A bare message reference as returned by list/search calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Opaque message id.
    pub id: String,
    /// Opaque thread id.
    #[serde(default)]
    pub thread_id: String,
}

/// Response shape of the message list/search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    /// Matching messages, in mailbox-native order (typically newest first).
    #[serde(default)]
    pub messages: Vec<MessageRef>,
}

/// A full or metadata-only message as returned by the get endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    /// Opaque message id.
    #[serde(default)]
    pub id: String,
    /// Opaque thread id.
    #[serde(default)]
    pub thread_id: String,
    /// Root of the MIME part tree.
    #[serde(default)]
    pub payload: MessagePayload,
}

/// One node of the MIME part tree.
///
/// Leaf parts carry their content in `body`; multipart containers carry
/// child parts in `parts`.  Malformed messages may nest arbitrarily deep,
/// so consumers must bound their recursion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    /// Declared content type, e.g. `text/plain` or `multipart/alternative`.
    #[serde(default)]
    pub mime_type: String,
    /// Header fields present on this part.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Body content for leaf parts.
    #[serde(default)]
    pub body: PartBody,
    /// Child parts for multipart containers.
    #[serde(default)]
    pub parts: Vec<MessagePayload>,
}

/// A single header field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    /// Construct a header field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body content of a leaf MIME part.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    /// Transport-encoded (URL-safe base64) content, absent for containers.
    #[serde(default)]
    pub data: Option<String>,
    /// Declared size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// The authenticated account's profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The account's own address; the From address for outgoing replies.
    #[serde(default)]
    pub email_address: String,
}

/// A transport-encoded outgoing message, ready for the send endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// URL-safe base64 encoding of the full wire-format message.
    pub raw: String,
    /// Thread the message belongs to; empty starts a new thread.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub thread_id: String,
}

/// Response shape of the send endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentMessage {
    /// Id assigned to the newly sent message.
    pub id: String,
}
