//! Inbox assistant — the five email operations behind the tool surface.
//!
//! Operations:
//! - `email_list_recent` — list recent inbox messages with metadata
//! - `email_search` — search messages by provider-native query
//! - `email_summarize` — fetch a message and summarize it with the model
//! - `email_generate_reply` — draft a reply body for an original email
//! - `email_send_reply` — send a confirmed reply inside its thread
//!
//! Every operation answers with a uniform envelope: `{"status": "success",
//! ...}` on success, `{"status": "error", "error_message": ...}` otherwise.
//! Callers branch on `status` only.  A failed metadata fetch for one message
//! during list/search is logged and the message skipped; it never fails the
//! whole call.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use inboxpilot_agent::{TextGenerator, reply_prompt, summary_prompt};
use inboxpilot_mailbox::extract::{
    NO_DATE, NO_SUBJECT, UNKNOWN_SENDER, extract_body, header_or, header_value, sender_address,
};
use inboxpilot_mailbox::{Mailbox, OutgoingReply};

use crate::error::{Result, ToolError};
use crate::traits::{AuthRequirement, HealthStatus, ToolDefinition, ToolSurface};

/// Label queried by the list operation.
const INBOX_LABEL: &str = "INBOX";

/// Default number of messages for list/search when the caller gives none.
const DEFAULT_MAX_RESULTS: u32 = 10;

/// Summary returned when no body could be extracted; the model is not
/// invoked in that case.
pub const EMPTY_BODY_SUMMARY: &str = "Could not extract email body to summarize.";

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// The operation façade over the mailbox and the generation backend.
///
/// Collaborators are injected as constructor-time initialization results;
/// a missing collaborator makes every dependent operation fail fast with a
/// service-unavailable envelope instead of consulting ambient globals.
pub struct InboxAssistant {
    id: String,
    mailbox: Option<Arc<dyn Mailbox>>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl InboxAssistant {
    /// Create an assistant from whatever collaborators initialized.
    pub fn new(
        id: impl Into<String>,
        mailbox: Option<Arc<dyn Mailbox>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            id: id.into(),
            mailbox,
            generator,
        }
    }

    fn mailbox(&self) -> Result<&Arc<dyn Mailbox>> {
        self.mailbox
            .as_ref()
            .ok_or_else(|| ToolError::ServiceUnavailable {
                service: "mailbox service".into(),
            })
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>> {
        self.generator
            .as_ref()
            .ok_or_else(|| ToolError::ServiceUnavailable {
                service: "generation backend".into(),
            })
    }

    // -----------------------------------------------------------------------
    // Operations (envelope-returning)
    // -----------------------------------------------------------------------

    /// List up to `max_results` recent inbox messages with metadata.
    pub async fn list_recent_emails(&self, max_results: u32) -> Value {
        self.envelope("list_recent_emails", self.try_browse(None, max_results).await)
    }

    /// Search messages by a provider-native query string.
    pub async fn search_emails(&self, query: &str, max_results: u32) -> Value {
        self.envelope(
            "search_emails",
            self.try_browse(Some(query), max_results).await,
        )
    }

    /// Fetch a message and summarize it, returning the extracted context
    /// alongside the summary.
    pub async fn summarize_email(&self, email_id: &str) -> Value {
        self.envelope("summarize_email", self.try_summarize(email_id).await)
    }

    /// Draft a reply body for the given original subject and body.
    pub async fn generate_reply(&self, original_subject: &str, original_body: &str) -> Value {
        self.envelope(
            "generate_reply",
            self.try_generate_reply(original_subject, original_body).await,
        )
    }

    /// Send a reply inside the original thread with correct threading
    /// headers.
    pub async fn send_reply(
        &self,
        to: &str,
        subject: &str,
        reply_body: &str,
        thread_id: &str,
        original_message_id: &str,
        references: &str,
    ) -> Value {
        self.envelope(
            "send_reply",
            self.try_send_reply(
                to,
                subject,
                reply_body,
                thread_id,
                original_message_id,
                references,
            )
            .await,
        )
    }

    /// Fold an operation result into the uniform envelope shape.
    fn envelope(&self, operation: &str, result: Result<Value>) -> Value {
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(surface = %self.id, operation, error = %e, "operation failed");
                json!({"status": "error", "error_message": e.to_string()})
            }
        }
    }

    // -----------------------------------------------------------------------
    // Operation internals
    // -----------------------------------------------------------------------

    /// Shared list/search: resolve ids, fetch metadata concurrently in id
    /// order, skip individual failures.
    async fn try_browse(&self, query: Option<&str>, max_results: u32) -> Result<Value> {
        let mailbox = self.mailbox()?;

        let refs = match query {
            None => mailbox.list_message_ids(INBOX_LABEL, max_results).await?,
            Some(q) => mailbox.search_message_ids(q, max_results).await?,
        };

        if refs.is_empty() {
            info!(surface = %self.id, query = query.unwrap_or(""), "no matching messages");
            return Ok(json!({"status": "success", "emails": []}));
        }

        // Fetches run concurrently; join_all yields results in the original
        // id order, so the final list matches the mailbox-native ordering.
        let fetches = refs.iter().map(|r| mailbox.get_message_metadata(&r.id));
        let results = future::join_all(fetches).await;

        let mut emails = Vec::with_capacity(refs.len());
        for (message_ref, fetched) in refs.iter().zip(results) {
            match fetched {
                Ok(message) => {
                    let headers = &message.payload.headers;
                    emails.push(json!({
                        "id": message_ref.id,
                        "threadId": message.thread_id,
                        "subject": header_or(headers, "Subject", NO_SUBJECT),
                        "from": header_or(headers, "From", UNKNOWN_SENDER),
                        "date": header_or(headers, "Date", NO_DATE),
                    }));
                }
                Err(e) => {
                    warn!(message_id = %message_ref.id, error = %e, "skipping message: metadata fetch failed");
                }
            }
        }

        Ok(json!({"status": "success", "emails": emails}))
    }

    async fn try_summarize(&self, email_id: &str) -> Result<Value> {
        let mailbox = self.mailbox()?;
        let generator = self.generator()?;

        let message = mailbox.get_message_full(email_id).await?;
        let headers = &message.payload.headers;

        let subject = header_or(headers, "Subject", NO_SUBJECT).to_string();
        let from = header_value(headers, "From").unwrap_or_default().to_string();
        let original_message_id = header_value(headers, "Message-ID").unwrap_or_default();
        let references = header_value(headers, "References").unwrap_or_default();
        let sender_email = sender_address(&from).to_string();

        let body = extract_body(&message.payload);

        let summary = if body.is_empty() {
            warn!(email_id, "could not extract body; returning placeholder summary");
            EMPTY_BODY_SUMMARY.to_string()
        } else {
            generator.generate(&summary_prompt(&subject, &body)).await?
        };

        Ok(json!({
            "status": "success",
            "summary": summary,
            "subject": subject,
            "original_body": body,
            "sender_email": sender_email,
            "thread_id": message.thread_id,
            "original_message_id": original_message_id,
            "references": references,
        }))
    }

    async fn try_generate_reply(
        &self,
        original_subject: &str,
        original_body: &str,
    ) -> Result<Value> {
        let generator = self.generator()?;

        if original_body.is_empty() {
            warn!("generating reply without an original email body");
        }

        let draft = generator
            .generate(&reply_prompt(original_subject, original_body))
            .await?;

        Ok(json!({"status": "success", "reply_body": draft.trim()}))
    }

    async fn try_send_reply(
        &self,
        to: &str,
        subject: &str,
        reply_body: &str,
        thread_id: &str,
        original_message_id: &str,
        references: &str,
    ) -> Result<Value> {
        let mailbox = self.mailbox()?;

        let profile = mailbox.get_profile().await?;
        if profile.email_address.is_empty() {
            return Err(ToolError::Validation {
                reason: "could not determine sender email address from profile".into(),
            });
        }

        let reply = OutgoingReply::compose(
            &profile.email_address,
            to,
            subject,
            reply_body,
            thread_id,
            original_message_id,
            references,
        );

        let sent = mailbox.send_raw(&reply.encode_raw()).await?;
        info!(message_id = %sent.id, thread_id, "reply sent");

        Ok(json!({"status": "success", "message_id": sent.id}))
    }
}

// ---------------------------------------------------------------------------
// Parameter extraction helpers
// ---------------------------------------------------------------------------

fn require_str<'a>(params: &'a Value, tool_name: &str, field: &str) -> Result<&'a str> {
    params
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParams {
            tool_name: tool_name.into(),
            reason: format!("missing required string field `{field}`"),
        })
}

fn optional_str<'a>(params: &'a Value, field: &str) -> &'a str {
    params.get(field).and_then(|v| v.as_str()).unwrap_or("")
}

fn optional_count(params: &Value, field: &str) -> u32 {
    params
        .get(field)
        .and_then(|v| v.as_u64())
        // Clamp rather than truncate; an oversized count must not wrap.
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_MAX_RESULTS)
}

// ---------------------------------------------------------------------------
// Tool surface
// ---------------------------------------------------------------------------

#[async_trait]
impl ToolSurface for InboxAssistant {
    fn id(&self) -> &str {
        &self.id
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "email_list_recent".into(),
                description: "List the most recent emails from the inbox with metadata".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of emails to return (default: 10)"
                        }
                    },
                    "required": []
                }),
            },
            ToolDefinition {
                name: "email_search".into(),
                description: "Search emails with a mailbox query string".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query (e.g. 'from:someone@example.com subject:report')"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of matches to return (default: 10)"
                        }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: "email_summarize".into(),
                description: "Fetch an email by id, extract its body, and summarize it".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "email_id": {
                            "type": "string",
                            "description": "The id of the email message to summarize"
                        }
                    },
                    "required": ["email_id"]
                }),
            },
            ToolDefinition {
                name: "email_generate_reply".into(),
                description: "Draft a reply body for an original email".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "original_subject": {
                            "type": "string",
                            "description": "Subject line of the email being replied to"
                        },
                        "original_body": {
                            "type": "string",
                            "description": "Body of the email being replied to"
                        }
                    },
                    "required": ["original_subject", "original_body"]
                }),
            },
            ToolDefinition {
                name: "email_send_reply".into(),
                description: "Send a confirmed reply within an email thread".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "to": {
                            "type": "string",
                            "description": "Recipient email address"
                        },
                        "subject": {
                            "type": "string",
                            "description": "Reply subject ('Re: ' is added if missing)"
                        },
                        "reply_body": {
                            "type": "string",
                            "description": "The confirmed reply body text"
                        },
                        "thread_id": {
                            "type": "string",
                            "description": "Thread the reply belongs to"
                        },
                        "original_message_id": {
                            "type": "string",
                            "description": "Message-ID header of the message being replied to"
                        },
                        "references": {
                            "type": "string",
                            "description": "References header value from the original email"
                        }
                    },
                    "required": ["to", "subject", "reply_body", "thread_id"]
                }),
            },
        ]
    }

    async fn execute_tool(&self, name: &str, params: Value) -> Result<Value> {
        match name {
            "email_list_recent" => {
                let max = optional_count(&params, "max_results");
                Ok(self.list_recent_emails(max).await)
            }
            "email_search" => {
                let query = require_str(&params, name, "query")?;
                let max = optional_count(&params, "max_results");
                Ok(self.search_emails(query, max).await)
            }
            "email_summarize" => {
                let email_id = require_str(&params, name, "email_id")?;
                Ok(self.summarize_email(email_id).await)
            }
            "email_generate_reply" => {
                let subject = require_str(&params, name, "original_subject")?;
                let body = require_str(&params, name, "original_body")?;
                Ok(self.generate_reply(subject, body).await)
            }
            "email_send_reply" => {
                let to = require_str(&params, name, "to")?;
                let subject = require_str(&params, name, "subject")?;
                let reply_body = require_str(&params, name, "reply_body")?;
                let thread_id = require_str(&params, name, "thread_id")?;
                let original_message_id = optional_str(&params, "original_message_id");
                let references = optional_str(&params, "references");
                Ok(self
                    .send_reply(
                        to,
                        subject,
                        reply_body,
                        thread_id,
                        original_message_id,
                        references,
                    )
                    .await)
            }
            _ => Err(ToolError::ToolNotFound {
                surface_id: self.id.clone(),
                tool_name: name.to_string(),
            }),
        }
    }

    async fn health_check(&self) -> HealthStatus {
        match (self.mailbox.is_some(), self.generator.is_some()) {
            (true, true) => HealthStatus::Healthy,
            (false, false) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        }
    }

    fn required_auth(&self) -> Option<AuthRequirement> {
        Some(AuthRequirement {
            provider: "google".into(),
            scopes: vec!["https://www.googleapis.com/auth/gmail.modify".into()],
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE;

    use inboxpilot_agent::{AgentError, Result as AgentResult};
    use inboxpilot_mailbox::types::{
        Header, MessageEnvelope, MessagePayload, MessageRef, PartBody, Profile, RawMessage,
        SentMessage,
    };
    use inboxpilot_mailbox::{MailboxError, Result as MailboxResult};

    // -- Fakes ---------------------------------------------------------------

    /// In-memory mailbox fake; `failing` ids error on metadata fetch.
    #[derive(Default)]
    struct FakeMailbox {
        messages: Vec<MessageEnvelope>,
        failing: HashSet<String>,
        profile_address: String,
        sent: Mutex<Vec<RawMessage>>,
    }

    impl FakeMailbox {
        fn with_messages(messages: Vec<MessageEnvelope>) -> Self {
            Self {
                messages,
                profile_address: "me@example.com".into(),
                ..Default::default()
            }
        }

        fn lookup(&self, id: &str) -> MailboxResult<MessageEnvelope> {
            if self.failing.contains(id) {
                return Err(MailboxError::Api {
                    status: 500,
                    body: "backend exploded".into(),
                });
            }
            self.messages
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .ok_or(MailboxError::Api {
                    status: 404,
                    body: "not found".into(),
                })
        }
    }

    #[async_trait]
    impl Mailbox for FakeMailbox {
        async fn list_message_ids(&self, _label: &str, max: u32) -> MailboxResult<Vec<MessageRef>> {
            Ok(self
                .messages
                .iter()
                .take(max as usize)
                .map(|m| MessageRef {
                    id: m.id.clone(),
                    thread_id: m.thread_id.clone(),
                })
                .collect())
        }

        async fn search_message_ids(
            &self,
            query: &str,
            max: u32,
        ) -> MailboxResult<Vec<MessageRef>> {
            // Match on subject substring, enough for these tests.
            Ok(self
                .messages
                .iter()
                .filter(|m| {
                    header_value(&m.payload.headers, "Subject")
                        .is_some_and(|s| s.contains(query))
                })
                .take(max as usize)
                .map(|m| MessageRef {
                    id: m.id.clone(),
                    thread_id: m.thread_id.clone(),
                })
                .collect())
        }

        async fn get_message_metadata(&self, id: &str) -> MailboxResult<MessageEnvelope> {
            self.lookup(id)
        }

        async fn get_message_full(&self, id: &str) -> MailboxResult<MessageEnvelope> {
            self.lookup(id)
        }

        async fn get_profile(&self) -> MailboxResult<Profile> {
            Ok(Profile {
                email_address: self.profile_address.clone(),
            })
        }

        async fn send_raw(&self, message: &RawMessage) -> MailboxResult<SentMessage> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(SentMessage { id: "sent-1".into() })
        }
    }

    /// Generator that answers with a fixed string.
    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> AgentResult<String> {
            Ok(self.0.to_string())
        }
    }

    /// Generator that must never be called.
    struct PanickingGenerator;

    #[async_trait]
    impl TextGenerator for PanickingGenerator {
        async fn generate(&self, _prompt: &str) -> AgentResult<String> {
            panic!("generation backend must not be invoked");
        }
    }

    /// Generator that always fails.
    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> AgentResult<String> {
            Err(AgentError::RequestFailed {
                reason: "model offline".into(),
            })
        }
    }

    // -- Builders ------------------------------------------------------------

    fn encode(text: &str) -> Option<String> {
        Some(URL_SAFE.encode(text.as_bytes()))
    }

    fn message(id: &str, thread: &str, subject: &str, from: &str, body: &str) -> MessageEnvelope {
        MessageEnvelope {
            id: id.into(),
            thread_id: thread.into(),
            payload: MessagePayload {
                mime_type: "text/plain".into(),
                headers: vec![
                    Header::new("Subject", subject),
                    Header::new("From", from),
                    Header::new("Date", "Mon, 24 Aug 2026 10:00:00 +0000"),
                    Header::new("Message-ID", format!("<{id}@mx>")),
                    Header::new("References", "<root@mx>"),
                ],
                body: PartBody {
                    data: if body.is_empty() { None } else { encode(body) },
                    size: body.len() as u64,
                },
                ..Default::default()
            },
        }
    }

    fn assistant_with(
        mailbox: FakeMailbox,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> InboxAssistant {
        InboxAssistant::new("inbox-test", Some(Arc::new(mailbox)), generator)
    }

    // -- Tool definitions ----------------------------------------------------

    #[test]
    fn tools_returns_exactly_five() {
        let assistant = InboxAssistant::new("inbox", None, None);
        assert_eq!(assistant.tools().len(), 5);
    }

    #[test]
    fn tools_have_expected_names() {
        let assistant = InboxAssistant::new("inbox", None, None);
        let names: Vec<String> = assistant.tools().iter().map(|t| t.name.clone()).collect();
        let expected = vec![
            "email_list_recent",
            "email_search",
            "email_summarize",
            "email_generate_reply",
            "email_send_reply",
        ];
        assert_eq!(names, expected);
    }

    #[test]
    fn tool_send_reply_requires_threading_fields() {
        let assistant = InboxAssistant::new("inbox", None, None);
        let tools = assistant.tools();
        let send = tools
            .iter()
            .find(|t| t.name == "email_send_reply")
            .expect("should have email_send_reply");
        let required = send.parameters["required"].as_array().unwrap();
        assert!(required.contains(&json!("to")));
        assert!(required.contains(&json!("thread_id")));
        assert!(required.contains(&json!("reply_body")));
    }

    // -- Availability --------------------------------------------------------

    #[tokio::test]
    async fn operations_fail_fast_without_mailbox() {
        let assistant = InboxAssistant::new(
            "inbox",
            None,
            Some(Arc::new(FixedGenerator("unused")) as Arc<dyn TextGenerator>),
        );
        let result = assistant.list_recent_emails(5).await;
        assert_eq!(result["status"], "error");
        assert!(
            result["error_message"]
                .as_str()
                .unwrap()
                .contains("mailbox service")
        );
    }

    #[tokio::test]
    async fn summarize_fails_fast_without_generator() {
        let assistant = assistant_with(FakeMailbox::default(), None);
        let result = assistant.summarize_email("m1").await;
        assert_eq!(result["status"], "error");
        assert!(
            result["error_message"]
                .as_str()
                .unwrap()
                .contains("generation backend")
        );
    }

    #[tokio::test]
    async fn health_reflects_collaborator_availability() {
        let healthy = assistant_with(
            FakeMailbox::default(),
            Some(Arc::new(FixedGenerator("x")) as Arc<dyn TextGenerator>),
        );
        assert_eq!(healthy.health_check().await, HealthStatus::Healthy);

        let degraded = assistant_with(FakeMailbox::default(), None);
        assert_eq!(degraded.health_check().await, HealthStatus::Degraded);

        let dead = InboxAssistant::new("inbox", None, None);
        assert_eq!(dead.health_check().await, HealthStatus::Unhealthy);
    }

    // -- Listing -------------------------------------------------------------

    #[tokio::test]
    async fn empty_inbox_is_success_with_empty_list() {
        let assistant = assistant_with(FakeMailbox::default(), None);
        let result = assistant.list_recent_emails(10).await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["emails"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn listing_returns_metadata_in_mailbox_order() {
        let mailbox = FakeMailbox::with_messages(vec![
            message("m1", "t1", "Newest", "Ada <ada@example.com>", "body one"),
            message("m2", "t2", "Older", "bob@example.com", "body two"),
        ]);
        let assistant = assistant_with(mailbox, None);

        let result = assistant.list_recent_emails(10).await;
        assert_eq!(result["status"], "success");
        let emails = result["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0]["id"], "m1");
        assert_eq!(emails[0]["subject"], "Newest");
        assert_eq!(emails[0]["from"], "Ada <ada@example.com>");
        assert_eq!(emails[1]["id"], "m2");
        assert_eq!(emails[1]["threadId"], "t2");
    }

    #[tokio::test]
    async fn corrupted_message_is_skipped_not_fatal() {
        let mut messages = Vec::new();
        for i in 0..10 {
            messages.push(message(
                &format!("m{i}"),
                "t",
                &format!("Subject {i}"),
                "x@example.com",
                "body",
            ));
        }
        let mut mailbox = FakeMailbox::with_messages(messages);
        mailbox.failing.insert("m4".into());
        let assistant = assistant_with(mailbox, None);

        let result = assistant.list_recent_emails(10).await;
        assert_eq!(result["status"], "success");
        let emails = result["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 9);
        assert!(emails.iter().all(|e| e["id"] != "m4"));
    }

    #[tokio::test]
    async fn listing_honors_max_results() {
        let messages = (0..5)
            .map(|i| message(&format!("m{i}"), "t", "S", "x@example.com", "b"))
            .collect();
        let assistant = assistant_with(FakeMailbox::with_messages(messages), None);

        let result = assistant.list_recent_emails(3).await;
        assert_eq!(result["emails"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_filters_by_query() {
        let mailbox = FakeMailbox::with_messages(vec![
            message("m1", "t1", "Invoice overdue", "a@example.com", "pay up"),
            message("m2", "t2", "Lunch plans", "b@example.com", "tacos"),
        ]);
        let assistant = assistant_with(mailbox, None);

        let result = assistant.search_emails("Invoice", 10).await;
        assert_eq!(result["status"], "success");
        let emails = result["emails"].as_array().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0]["id"], "m1");
    }

    // -- Summarization -------------------------------------------------------

    #[tokio::test]
    async fn summarize_returns_summary_and_context() {
        let mailbox = FakeMailbox::with_messages(vec![message(
            "m1",
            "t1",
            "Budget",
            "Ada Lovelace <ada@example.com>",
            "The budget needs review by Friday.",
        )]);
        let assistant = assistant_with(
            mailbox,
            Some(Arc::new(FixedGenerator("A summary.")) as Arc<dyn TextGenerator>),
        );

        let result = assistant.summarize_email("m1").await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["summary"], "A summary.");
        assert_eq!(result["subject"], "Budget");
        assert_eq!(result["sender_email"], "ada@example.com");
        assert_eq!(result["thread_id"], "t1");
        assert_eq!(result["original_message_id"], "<m1@mx>");
        assert_eq!(result["references"], "<root@mx>");
        assert_eq!(result["original_body"], "The budget needs review by Friday.");
    }

    #[tokio::test]
    async fn summarize_empty_body_skips_generation() {
        let mailbox = FakeMailbox::with_messages(vec![message(
            "m1",
            "t1",
            "Empty",
            "a@example.com",
            "",
        )]);
        // The panicking generator proves the backend is never consulted.
        let assistant = assistant_with(
            mailbox,
            Some(Arc::new(PanickingGenerator) as Arc<dyn TextGenerator>),
        );

        let result = assistant.summarize_email("m1").await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["summary"], EMPTY_BODY_SUMMARY);
        assert_eq!(result["original_body"], "");
    }

    #[tokio::test]
    async fn summarize_generation_failure_becomes_error_envelope() {
        let mailbox = FakeMailbox::with_messages(vec![message(
            "m1",
            "t1",
            "Budget",
            "a@example.com",
            "content",
        )]);
        let assistant = assistant_with(
            mailbox,
            Some(Arc::new(FailingGenerator) as Arc<dyn TextGenerator>),
        );

        let result = assistant.summarize_email("m1").await;
        assert_eq!(result["status"], "error");
        assert!(
            result["error_message"]
                .as_str()
                .unwrap()
                .contains("model offline")
        );
    }

    #[tokio::test]
    async fn summarize_unknown_message_is_error_envelope() {
        let assistant = assistant_with(
            FakeMailbox::default(),
            Some(Arc::new(FixedGenerator("x")) as Arc<dyn TextGenerator>),
        );
        let result = assistant.summarize_email("ghost").await;
        assert_eq!(result["status"], "error");
    }

    // -- Reply generation ----------------------------------------------------

    #[tokio::test]
    async fn generate_reply_trims_whitespace() {
        let assistant = InboxAssistant::new(
            "inbox",
            None,
            Some(Arc::new(FixedGenerator("  draft text \n")) as Arc<dyn TextGenerator>),
        );
        let result = assistant.generate_reply("Budget", "original body").await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["reply_body"], "draft text");
    }

    #[tokio::test]
    async fn generate_reply_proceeds_on_empty_body() {
        let assistant = InboxAssistant::new(
            "inbox",
            None,
            Some(Arc::new(FixedGenerator("draft")) as Arc<dyn TextGenerator>),
        );
        let result = assistant.generate_reply("Budget", "").await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["reply_body"], "draft");
    }

    // -- Sending -------------------------------------------------------------

    #[tokio::test]
    async fn send_reply_returns_new_message_id() {
        let assistant = assistant_with(FakeMailbox::with_messages(vec![]), None);
        let result = assistant
            .send_reply("ada@example.com", "Budget", "Sounds good.", "t1", "", "")
            .await;
        assert_eq!(result["status"], "success");
        assert_eq!(result["message_id"], "sent-1");
    }

    #[tokio::test]
    async fn send_reply_wire_message_has_threading_headers() {
        let mailbox = Arc::new(FakeMailbox::with_messages(vec![]));
        let assistant = InboxAssistant::new(
            "inbox",
            Some(mailbox.clone() as Arc<dyn Mailbox>),
            None,
        );

        let result = assistant
            .send_reply(
                "ada@example.com",
                "Budget",
                "Sounds good.",
                "t1",
                "<m1@mx>",
                "<root@mx>",
            )
            .await;
        assert_eq!(result["status"], "success");

        let sent = mailbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].thread_id, "t1");

        let wire = URL_SAFE.decode(&sent[0].raw).unwrap();
        let wire = String::from_utf8(wire).unwrap();
        assert!(wire.contains("To: ada@example.com\r\n"));
        assert!(wire.contains("From: me@example.com\r\n"));
        assert!(wire.contains("Subject: Re: Budget\r\n"));
        assert!(wire.contains("In-Reply-To: <m1@mx>\r\n"));
        assert!(wire.contains("References: <root@mx> <m1@mx>\r\n"));
        assert!(wire.ends_with("Sounds good."));
    }

    #[tokio::test]
    async fn send_reply_empty_profile_is_validation_error() {
        let mailbox = FakeMailbox {
            profile_address: String::new(),
            ..Default::default()
        };
        let assistant = assistant_with(mailbox, None);

        let result = assistant
            .send_reply("a@x", "S", "B", "t", "", "")
            .await;
        assert_eq!(result["status"], "error");
        assert!(
            result["error_message"]
                .as_str()
                .unwrap()
                .contains("sender email address")
        );
    }

    // -- Parameter extraction ------------------------------------------------

    #[test]
    fn optional_count_defaults_and_reads_values() {
        assert_eq!(optional_count(&json!({}), "max_results"), DEFAULT_MAX_RESULTS);
        assert_eq!(optional_count(&json!({"max_results": 3}), "max_results"), 3);
    }

    #[test]
    fn optional_count_clamps_oversized_values() {
        // 2^32 + 5 must saturate, not wrap around to 5.
        let params = json!({"max_results": 4_294_967_301u64});
        assert_eq!(optional_count(&params, "max_results"), u32::MAX);
        assert_eq!(
            optional_count(&json!({"max_results": u64::MAX}), "max_results"),
            u32::MAX
        );
    }

    // -- Dispatch ------------------------------------------------------------

    #[tokio::test]
    async fn execute_tool_dispatches_by_name() {
        let assistant = assistant_with(FakeMailbox::default(), None);
        let result = assistant
            .execute_tool("email_list_recent", json!({}))
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
    }

    #[tokio::test]
    async fn execute_tool_unknown_name_fails() {
        let assistant = InboxAssistant::new("inbox", None, None);
        let err = assistant
            .execute_tool("email_transmogrify", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn execute_tool_missing_required_param_fails() {
        let assistant = InboxAssistant::new("inbox", None, None);
        let err = assistant
            .execute_tool("email_summarize", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams { .. }));
    }
}
