//! Mailbox REST client.
//!
//! [`MailboxClient`] talks to a Gmail-style REST API with a pre-established
//! bearer token.  Token acquisition and refresh live outside this crate; if
//! the token is rejected the call surfaces a [`MailboxError::Api`] like any
//! other failed request.  Every request carries a bounded timeout so a stuck
//! connection becomes an ordinary transport error.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{MailboxError, Result};
use crate::types::{MessageEnvelope, MessageList, MessageRef, Profile, RawMessage, SentMessage};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header names requested for metadata-only fetches.
const METADATA_HEADERS: [&str; 3] = ["Subject", "From", "Date"];

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The mailbox operations the assistant depends on.
///
/// Implemented over HTTP by [`MailboxClient`]; tests substitute in-memory
/// fakes at this seam.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// List up to `max` message refs from the given label, mailbox-native order.
    async fn list_message_ids(&self, label: &str, max: u32) -> Result<Vec<MessageRef>>;

    /// List up to `max` message refs matching a provider-native query.
    async fn search_message_ids(&self, query: &str, max: u32) -> Result<Vec<MessageRef>>;

    /// Fetch a message with headers only (Subject, From, Date).
    async fn get_message_metadata(&self, id: &str) -> Result<MessageEnvelope>;

    /// Fetch a message with its full part tree.
    async fn get_message_full(&self, id: &str) -> Result<MessageEnvelope>;

    /// Fetch the authenticated account's profile.
    async fn get_profile(&self) -> Result<Profile>;

    /// Send a transport-encoded message.
    async fn send_raw(&self, message: &RawMessage) -> Result<SentMessage>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Mailbox client over the service's REST API.
pub struct MailboxClient {
    base_url: String,
    access_token: String,
    http: reqwest::Client,
}

impl MailboxClient {
    /// Create a client against the default API endpoint.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API endpoint (mock servers, proxies).
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("inboxpilot/0.1")
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            http,
        })
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and decode the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "mailbox GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        Self::decode_json(response).await
    }

    /// Check the status and decode the JSON body.
    async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailboxError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response.json::<T>().await.map_err(|e| MailboxError::Decode {
            reason: e.to_string(),
        })
    }

    /// Shared implementation of list and search.
    async fn list_refs(&self, query: &[(&str, &str)]) -> Result<Vec<MessageRef>> {
        let list: MessageList = self.get_json("/users/me/messages", query).await?;
        Ok(list.messages)
    }
}

#[async_trait]
impl Mailbox for MailboxClient {
    async fn list_message_ids(&self, label: &str, max: u32) -> Result<Vec<MessageRef>> {
        let max = max.to_string();
        self.list_refs(&[("labelIds", label), ("maxResults", &max)])
            .await
    }

    async fn search_message_ids(&self, query: &str, max: u32) -> Result<Vec<MessageRef>> {
        let max = max.to_string();
        self.list_refs(&[("q", query), ("maxResults", &max)]).await
    }

    async fn get_message_metadata(&self, id: &str) -> Result<MessageEnvelope> {
        let mut query: Vec<(&str, &str)> = vec![("format", "metadata")];
        for name in METADATA_HEADERS {
            query.push(("metadataHeaders", name));
        }
        self.get_json(&format!("/users/me/messages/{id}"), &query)
            .await
    }

    async fn get_message_full(&self, id: &str) -> Result<MessageEnvelope> {
        self.get_json(&format!("/users/me/messages/{id}"), &[("format", "full")])
            .await
    }

    async fn get_profile(&self) -> Result<Profile> {
        self.get_json("/users/me/profile", &[]).await
    }

    async fn send_raw(&self, message: &RawMessage) -> Result<SentMessage> {
        let url = format!("{}/users/me/messages/send", self.base_url);
        debug!(url = %url, thread_id = %message.thread_id, "mailbox POST send");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(message)
            .send()
            .await?;

        Self::decode_json(response).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
