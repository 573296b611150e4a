//! Tool surface and reply workflow for Inboxpilot.
//!
//! [`assistant::InboxAssistant`] exposes the five email operations (list,
//! search, summarize, generate-reply, send-reply) behind the
//! [`ToolSurface`] trait so an LLM orchestrator can bind them as callable
//! tools.  Every operation answers with a uniform result envelope —
//! `{"status": "success", ...}` or `{"status": "error", "error_message"}` —
//! and never lets a collaborator failure escape.
//!
//! [`workflow::ReplyWorkflow`] is the explicit state machine guarding the
//! send path: a reply can only be dispatched after the draft was surfaced
//! to the human and an affirmative confirmation was observed, at most once
//! per confirmation.

pub mod assistant;
pub mod error;
pub mod traits;
pub mod workflow;

pub use assistant::InboxAssistant;
pub use error::{Result, ToolError};
pub use traits::{AuthRequirement, HealthStatus, ToolDefinition, ToolSurface};
pub use workflow::{Decision, ReplyContext, ReplyWorkflow, SendAuthorization, WorkflowState};
