//! Message log and request lifecycle for a single conversation.
//!
//! The log is append-only between resets and at most one exchange is
//! outstanding at a time. Each exchange carries a [`Ticket`]; a completion
//! whose ticket is no longer current (after `stop` or `reset`) is dropped.

use crate::llm::BackendError;
use crate::models::Message;
use serde::Serialize;

/// Shown in place of an answer whenever an exchange fails.
pub const APOLOGY: &str = "Sorry, an error occurred. Please try again later.";

/// Input rules and affordances for the two page layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Trimmed empty input is silently ignored.
    #[default]
    Classic,
    /// Requires a few characters, reports rejections, offers stop and retry.
    Assisted,
}

impl Variant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "assisted" => Some(Variant::Assisted),
            _ => None,
        }
    }

    pub fn min_query_chars(&self) -> usize {
        match self {
            Variant::Classic => 1,
            Variant::Assisted => 3,
        }
    }

    pub fn reports_rejections(&self) -> bool {
        matches!(self, Variant::Assisted)
    }

    pub fn exposes_controls(&self) -> bool {
        matches!(self, Variant::Assisted)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Message is empty")]
    Empty,
    #[error("Please enter at least {min} characters for your question.")]
    TooShort { min: usize },
    #[error("A request is already in flight")]
    Busy,
    #[error("Nothing to retry")]
    NothingToRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight(Ticket),
}

/// An exchange the caller must now carry out against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub query: String,
}

/// What the presentational layer renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub errored: bool,
    pub show_intro: bool,
    /// Bumped by every reset, so a renderer can tell a fresh log from a
    /// continued one even when two updates are coalesced.
    pub generation: u64,
}

#[derive(Debug)]
pub struct Conversation {
    variant: Variant,
    messages: Vec<Message>,
    state: RequestState,
    next_ticket: u64,
    last_query: Option<String>,
    errored: bool,
    generation: u64,
}

impl Conversation {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            messages: Vec::new(),
            state: RequestState::Idle,
            next_ticket: 0,
            last_query: None,
            errored: false,
            generation: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::InFlight(_))
    }

    pub fn errored(&self) -> bool {
        self.errored
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages.clone(),
            loading: self.is_loading(),
            errored: self.errored,
            show_intro: self.messages.is_empty(),
            generation: self.generation,
        }
    }

    /// Append the user's message right away and open an exchange for it.
    ///
    /// The variant's minimum length and the single-exchange rule are
    /// enforced here rather than by the input layer, so a rejected text
    /// leaves the log untouched.
    pub fn submit(&mut self, text: &str) -> Result<PendingRequest, InputError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(InputError::Empty);
        }
        let min = self.variant.min_query_chars();
        if query.chars().count() < min {
            return Err(InputError::TooShort { min });
        }
        if self.is_loading() {
            return Err(InputError::Busy);
        }

        self.messages.push(Message::user(query));
        self.last_query = Some(query.to_string());
        Ok(self.begin(query.to_string()))
    }

    /// Re-issue the last query without appending another user message.
    pub fn retry(&mut self) -> Result<PendingRequest, InputError> {
        if self.is_loading() {
            return Err(InputError::Busy);
        }
        let query = self.last_query.clone().ok_or(InputError::NothingToRetry)?;
        Ok(self.begin(query))
    }

    fn begin(&mut self, query: String) -> PendingRequest {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.state = RequestState::InFlight(ticket);
        self.errored = false;
        tracing::debug!(ticket = ticket.0, "exchange in flight");
        PendingRequest { ticket, query }
    }

    /// Apply the outcome of an exchange. Returns `false` when the ticket is
    /// stale and the outcome was ignored.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Message, BackendError>) -> bool {
        if self.state != RequestState::InFlight(ticket) {
            tracing::debug!(ticket = ticket.0, "ignoring stale response");
            return false;
        }

        match outcome {
            Ok(message) => self.messages.push(message),
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = %e, "chat exchange failed");
                self.messages.push(Message::assistant(APOLOGY));
                self.errored = true;
            }
        }
        self.state = RequestState::Idle;
        true
    }

    /// Abandon the outstanding exchange without appending an answer.
    pub fn stop(&mut self) -> bool {
        match self.state {
            RequestState::InFlight(ticket) => {
                tracing::debug!(ticket = ticket.0, "exchange stopped");
                self.state = RequestState::Idle;
                true
            }
            RequestState::Idle => false,
        }
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.state = RequestState::Idle;
        self.last_query = None;
        self.errored = false;
        self.generation += 1;
    }
}
