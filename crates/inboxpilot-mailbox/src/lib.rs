//! Mailbox access for Inboxpilot — REST client, MIME extraction, reply
//! composition.
//!
//! The [`Mailbox`] trait in [`client`] is the seam between the assistant and
//! the remote mail service; [`client::MailboxClient`] implements it over the
//! service's REST API.  [`extract`] pulls plain-text bodies and headers out
//! of the message part tree, and [`compose`] builds correctly-threaded reply
//! messages in the wire format the send endpoint requires.

pub mod client;
pub mod compose;
pub mod error;
pub mod extract;
pub mod types;

pub use client::{Mailbox, MailboxClient};
pub use compose::{OutgoingReply, build_references, normalize_reply_subject};
pub use error::{MailboxError, Result};
pub use extract::{extract_body, header_or, header_value, sender_address};
pub use types::{
    Header, MessageEnvelope, MessageList, MessagePayload, MessageRef, PartBody, Profile,
    RawMessage, SentMessage,
};
