//! Reply workflow state machine.
//!
//! The send path is guarded by an explicit state variable rather than by
//! orchestrator prompt wording: a reply can only be dispatched after the
//! draft was shown to the human verbatim and an affirmative confirmation
//! was observed.  Resolving a confirmation consumes the waiting state, so a
//! [`SendAuthorization`] can be minted at most once — an ambiguous follow-up
//! can never trigger a second send.
//!
//! ```text
//! Idle ──> Browsing ──> Summarized ──> Drafted ──> AwaitingConfirmation
//!   ^                                                   │         │
//!   │            decline / reset / send failure         │ yes     │ no
//!   └───────────────────────────────────────────────────┼─────────┘
//!                                                  Dispatching ──> Sent
//! ```

use tracing::debug;

/// Everything carried forward from a summarized email that a reply needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub subject: String,
    pub body: String,
    pub sender_email: String,
    pub thread_id: String,
    pub original_message_id: String,
    pub references: String,
}

/// The workflow position within one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing in flight.
    Idle,
    /// A list or search ran; no message singled out yet.
    Browsing,
    /// A message was summarized; its context is carried forward.
    Summarized(ReplyContext),
    /// A reply draft exists but has not been shown to the human.
    Drafted {
        context: ReplyContext,
        draft: String,
    },
    /// The draft was surfaced verbatim; waiting on the human's response.
    AwaitingConfirmation {
        context: ReplyContext,
        draft: String,
    },
    /// Confirmation consumed; the send call is in flight.
    Dispatching,
    /// The reply went out.
    Sent { message_id: String },
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Browsing => "browsing",
            Self::Summarized(_) => "summarized",
            Self::Drafted { .. } => "drafted",
            Self::AwaitingConfirmation { .. } => "awaiting_confirmation",
            Self::Dispatching => "dispatching",
            Self::Sent { .. } => "sent",
        }
    }
}

/// Workflow transition errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The event is not legal in the current state.
    #[error("invalid workflow transition: `{event}` is not allowed in state `{state}`")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Outcome of resolving a confirmation response.
#[derive(Debug)]
pub enum Decision {
    /// The human confirmed; send with this authorization.
    Send(SendAuthorization),
    /// Anything other than a clear yes; the draft is dropped.
    Declined,
}

/// Proof that a send was explicitly confirmed.
///
/// Only mintable by [`ReplyWorkflow::resolve_confirmation`], and minting it
/// consumes the awaiting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAuthorization {
    pub context: ReplyContext,
    pub draft: String,
}

/// Classify a free-form response as an explicit send confirmation.
///
/// Deliberately conservative: anything not on the allow-list declines.
pub fn is_affirmative(response: &str) -> bool {
    const AFFIRMATIVES: [&str; 14] = [
        "y",
        "yes",
        "yes, send it",
        "yes send it",
        "ok",
        "okay",
        "sure",
        "send",
        "send it",
        "confirm",
        "confirmed",
        "go ahead",
        "looks good",
        "lgtm",
    ];
    let normalized = response.trim().to_lowercase();
    let normalized = normalized.trim_end_matches(['.', '!']);
    AFFIRMATIVES.contains(&normalized)
}

/// The confirmation-gated reply workflow for one conversation.
#[derive(Debug)]
pub struct ReplyWorkflow {
    state: WorkflowState,
}

impl Default for ReplyWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyWorkflow {
    /// Start in `Idle`.
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    fn invalid(&self, event: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    fn transition(&mut self, event: &'static str, next: WorkflowState) {
        debug!(event, to = next.name(), "workflow transition");
        self.state = next;
    }

    /// A list or search operation ran.
    pub fn begin_browsing(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Idle | WorkflowState::Browsing => {
                self.transition("begin_browsing", WorkflowState::Browsing);
                Ok(())
            }
            _ => Err(self.invalid("begin_browsing")),
        }
    }

    /// A summarize operation succeeded; carry its context forward.
    pub fn record_summary(&mut self, context: ReplyContext) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Idle | WorkflowState::Browsing => {
                self.transition("record_summary", WorkflowState::Summarized(context));
                Ok(())
            }
            _ => Err(self.invalid("record_summary")),
        }
    }

    /// A reply draft was generated for the summarized email.
    pub fn record_draft(&mut self, draft: String) -> Result<(), WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::Summarized(context) => {
                self.transition("record_draft", WorkflowState::Drafted { context, draft });
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("record_draft"))
            }
        }
    }

    /// The draft is being shown to the human verbatim; returns it.
    ///
    /// No further tool may be invoked until a response is observed.
    pub fn surface_draft(&mut self) -> Result<String, WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::Drafted { context, draft } => {
                let surfaced = draft.clone();
                self.transition(
                    "surface_draft",
                    WorkflowState::AwaitingConfirmation { context, draft },
                );
                Ok(surfaced)
            }
            other => {
                self.state = other;
                Err(self.invalid("surface_draft"))
            }
        }
    }

    /// Resolve the human's response to the surfaced draft.
    ///
    /// Affirmative responses consume the waiting state and yield the one
    /// [`SendAuthorization`]; everything else drops the draft and returns
    /// the workflow to `Idle`.
    pub fn resolve_confirmation(&mut self, response: &str) -> Result<Decision, WorkflowError> {
        match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::AwaitingConfirmation { context, draft } => {
                if is_affirmative(response) {
                    self.transition("resolve_confirmation", WorkflowState::Dispatching);
                    Ok(Decision::Send(SendAuthorization { context, draft }))
                } else {
                    self.transition("resolve_confirmation", WorkflowState::Idle);
                    Ok(Decision::Declined)
                }
            }
            other => {
                self.state = other;
                Err(self.invalid("resolve_confirmation"))
            }
        }
    }

    /// The confirmed send succeeded.
    pub fn record_sent(&mut self, message_id: String) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Dispatching => {
                self.transition("record_sent", WorkflowState::Sent { message_id });
                Ok(())
            }
            _ => Err(self.invalid("record_sent")),
        }
    }

    /// The confirmed send failed; back to idle, no automatic retry.
    pub fn record_send_failure(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Dispatching => {
                self.transition("record_send_failure", WorkflowState::Idle);
                Ok(())
            }
            _ => Err(self.invalid("record_send_failure")),
        }
    }

    /// Abandon whatever is in flight.
    pub fn reset(&mut self) {
        self.transition("reset", WorkflowState::Idle);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
