//! Threaded reply composition.
//!
//! Builds the outgoing message for a reply so that mail clients file it in
//! the right conversation: `In-Reply-To` names the message being answered
//! and `References` extends the original chain with that message's id.  The
//! wire format is a single plain-text UTF-8 part with CRLF line endings,
//! transport-encoded as URL-safe base64 for the send endpoint.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use crate::types::RawMessage;

/// Normalize a reply subject so it starts with `Re:`.
///
/// The check is case-insensitive and the operation is idempotent:
/// `"RE: hi"` and `"re: hi"` pass through unchanged.
pub fn normalize_reply_subject(subject: &str) -> String {
    if subject.to_lowercase().starts_with("re:") {
        subject.to_string()
    } else {
        format!("Re: {subject}")
    }
}

/// Build the References header value for a reply.
///
/// Appends the original message id to the original References chain,
/// trimmed.  An empty chain yields the message id alone; if both inputs are
/// empty the result is empty and the header is omitted.
pub fn build_references(references: &str, original_message_id: &str) -> String {
    if references.is_empty() {
        original_message_id.to_string()
    } else {
        format!("{references} {original_message_id}")
            .trim()
            .to_string()
    }
}

/// A fully derived outgoing reply, ready for serialization.
///
/// Constructed once per send and immediately encoded; nothing here is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    pub to: String,
    pub sender: String,
    /// Normalized subject, always starting with `Re:`.
    pub subject: String,
    pub body: String,
    pub thread_id: String,
    /// Original message id; `None` when the original carried no Message-ID.
    pub in_reply_to: Option<String>,
    /// Cumulative references chain; `None` when it would be empty.
    pub references: Option<String>,
}

impl OutgoingReply {
    /// Derive a reply envelope from the original message's threading fields.
    pub fn compose(
        sender: &str,
        to: &str,
        subject: &str,
        body: &str,
        thread_id: &str,
        original_message_id: &str,
        references: &str,
    ) -> Self {
        let in_reply_to =
            (!original_message_id.is_empty()).then(|| original_message_id.to_string());
        let chain = build_references(references, original_message_id);
        let references = (!chain.is_empty()).then_some(chain);

        Self {
            to: to.to_string(),
            sender: sender.to_string(),
            subject: normalize_reply_subject(subject),
            body: body.to_string(),
            thread_id: thread_id.to_string(),
            in_reply_to,
            references,
        }
    }

    /// Serialize to the RFC 2822 wire format.
    pub fn to_rfc822(&self) -> String {
        let mut message = String::with_capacity(self.body.len() + 256);
        message.push_str(&format!("To: {}\r\n", self.to));
        message.push_str(&format!("From: {}\r\n", self.sender));
        message.push_str(&format!("Subject: {}\r\n", self.subject));
        if let Some(in_reply_to) = &self.in_reply_to {
            message.push_str(&format!("In-Reply-To: {in_reply_to}\r\n"));
        }
        if let Some(references) = &self.references {
            message.push_str(&format!("References: {references}\r\n"));
        }
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        message.push_str("\r\n");
        message.push_str(&self.body);
        message
    }

    /// Transport-encode the wire message for the send endpoint.
    pub fn encode_raw(&self) -> RawMessage {
        RawMessage {
            raw: URL_SAFE.encode(self.to_rfc822().as_bytes()),
            thread_id: self.thread_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Subject normalization --

    #[test]
    fn subject_gains_re_prefix() {
        assert_eq!(normalize_reply_subject("Budget"), "Re: Budget");
    }

    #[test]
    fn subject_with_re_passes_through() {
        assert_eq!(normalize_reply_subject("Re: Budget"), "Re: Budget");
        assert_eq!(normalize_reply_subject("RE: Budget"), "RE: Budget");
        assert_eq!(normalize_reply_subject("re: Budget"), "re: Budget");
    }

    #[test]
    fn subject_normalization_is_idempotent() {
        let once = normalize_reply_subject("Budget");
        assert_eq!(normalize_reply_subject(&once), once);
    }

    // -- References chain --

    #[test]
    fn references_from_empty_chain_is_message_id_alone() {
        assert_eq!(build_references("", "<m1>"), "<m1>");
    }

    #[test]
    fn references_appends_to_existing_chain() {
        assert_eq!(build_references("<a> <b>", "<m1>"), "<a> <b> <m1>");
    }

    #[test]
    fn references_with_empty_message_id_trims() {
        assert_eq!(build_references("<a> <b>", ""), "<a> <b>");
    }

    #[test]
    fn references_both_empty_is_empty() {
        assert_eq!(build_references("", ""), "");
    }

    // -- Envelope derivation --

    fn sample_reply() -> OutgoingReply {
        OutgoingReply::compose(
            "me@example.com",
            "you@example.com",
            "Budget",
            "Sounds good.",
            "thread-7",
            "<m1@mx>",
            "<a@mx> <b@mx>",
        )
    }

    #[test]
    fn compose_normalizes_subject_and_threads_headers() {
        let reply = sample_reply();
        assert_eq!(reply.subject, "Re: Budget");
        assert_eq!(reply.in_reply_to.as_deref(), Some("<m1@mx>"));
        assert_eq!(reply.references.as_deref(), Some("<a@mx> <b@mx> <m1@mx>"));
        assert_eq!(reply.thread_id, "thread-7");
    }

    #[test]
    fn compose_omits_threading_headers_when_original_id_missing() {
        let reply = OutgoingReply::compose(
            "me@example.com",
            "you@example.com",
            "Budget",
            "Hi",
            "thread-7",
            "",
            "",
        );
        assert_eq!(reply.in_reply_to, None);
        assert_eq!(reply.references, None);
    }

    #[test]
    fn compose_keeps_references_without_message_id() {
        let reply = OutgoingReply::compose(
            "me@example.com",
            "you@example.com",
            "Budget",
            "Hi",
            "thread-7",
            "",
            "<a@mx>",
        );
        assert_eq!(reply.in_reply_to, None);
        assert_eq!(reply.references.as_deref(), Some("<a@mx>"));
    }

    // -- Wire format --

    #[test]
    fn rfc822_contains_headers_and_body() {
        let wire = sample_reply().to_rfc822();
        assert!(wire.starts_with("To: you@example.com\r\n"));
        assert!(wire.contains("From: me@example.com\r\n"));
        assert!(wire.contains("Subject: Re: Budget\r\n"));
        assert!(wire.contains("In-Reply-To: <m1@mx>\r\n"));
        assert!(wire.contains("References: <a@mx> <b@mx> <m1@mx>\r\n"));
        assert!(wire.contains("Content-Type: text/plain; charset=UTF-8\r\n"));
        assert!(wire.ends_with("\r\n\r\nSounds good."));
    }

    #[test]
    fn rfc822_omits_absent_threading_headers() {
        let reply = OutgoingReply::compose("me@x", "you@x", "Hi", "Body", "t", "", "");
        let wire = reply.to_rfc822();
        assert!(!wire.contains("In-Reply-To:"));
        assert!(!wire.contains("References:"));
    }

    #[test]
    fn encode_raw_round_trips_and_carries_thread_id() {
        let reply = sample_reply();
        let raw = reply.encode_raw();
        assert_eq!(raw.thread_id, "thread-7");

        let decoded = URL_SAFE.decode(&raw.raw).unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert_eq!(decoded, reply.to_rfc822());
    }
}
