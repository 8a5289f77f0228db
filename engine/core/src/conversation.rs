//! Conversation Session
//!
//! Owns the chat transcript and drives the "chat" channel.
//!
//! Sending is a two-phase update. The user's message is appended as soon as
//! the channel is acquired (provisional), before the service is contacted,
//! so latency never delays or loses it. When the call resolves, the
//! assistant's answer (or a fixed apology) is appended (confirmed). Failures
//! therefore stay inside the transcript; no separate error surface is needed.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::backend::{AssistantApi, QueryRequest, QueryResponse};
use crate::lifecycle::{RequestController, StartOutcome};
use crate::markup::{self, RenderedLine};

/// First message of every conversation
pub const GREETING: &str = "Hi, how can I help you today?";

/// Agent reply appended when a chat turn fails
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request. Please try again.";

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// The person using the client
    User,
    /// The assistant
    Agent,
}

/// One transcript entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: MessageRole,
    /// Raw content, markup included
    pub content: String,
}

impl Message {
    /// A message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// A message from the assistant
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Agent,
            content: content.into(),
        }
    }

    /// Format the content for display
    #[must_use]
    pub fn render(&self) -> Vec<RenderedLine> {
        markup::format(&self.content)
    }
}

/// A message ready for display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Who sent the message
    pub role: MessageRole,
    /// Formatted content
    pub lines: Vec<RenderedLine>,
}

/// The single channel a conversation uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversationChannel {
    /// One question/answer turn
    Chat,
}

/// What happened to a submitted message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty or whitespace; nothing happened
    Empty,
    /// A turn was already in flight; nothing happened
    Busy,
    /// The assistant answered
    Answered,
    /// The turn failed and the apology was appended
    Apologized,
}

/// Chat transcript plus the machinery to extend it
pub struct ConversationSession {
    api: Arc<dyn AssistantApi>,
    controller: RequestController<ConversationChannel>,
    history: RwLock<Vec<Message>>,
}

impl ConversationSession {
    /// Start a conversation seeded with the greeting
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self {
            api,
            controller: RequestController::new(),
            history: RwLock::new(vec![Message::agent(GREETING)]),
        }
    }

    /// Send `text` to the assistant
    ///
    /// Whitespace-only input and submissions while a turn is in flight are
    /// ignored. The user's message is recorded as typed; the trimmed text is
    /// what the service receives.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let query = text.trim();
        if query.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.is_thinking() {
            return SubmitOutcome::Busy;
        }

        let outcome = self
            .controller
            .start(
                ConversationChannel::Chat,
                QueryRequest::new(query),
                |request| {
                    // Provisional: only runs once the channel is ours
                    self.append(Message::user(text));
                    let api = Arc::clone(&self.api);
                    async move { api.query(&request).await }
                },
                |reply: QueryResponse| self.append(Message::agent(reply.result)),
                |_| self.append(Message::agent(APOLOGY)),
            )
            .await;

        match outcome {
            StartOutcome::Succeeded => SubmitOutcome::Answered,
            StartOutcome::Failed(_) => SubmitOutcome::Apologized,
            StartOutcome::Rejected => SubmitOutcome::Busy,
        }
    }

    /// Whether a chat turn is in flight
    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.controller.is_pending(ConversationChannel::Chat)
    }

    /// Snapshot of the transcript
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.history.read().clone()
    }

    /// Number of messages, greeting included
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    /// Whether the transcript is empty (never true once seeded)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<Message> {
        self.history.read().last().cloned()
    }

    /// Format every message for display
    ///
    /// Each message is formatted independently; the transcript itself is
    /// not touched.
    #[must_use]
    pub fn render(&self) -> Vec<RenderedMessage> {
        self.history
            .read()
            .iter()
            .map(|m| RenderedMessage {
                role: m.role,
                lines: m.render(),
            })
            .collect()
    }

    fn append(&self, message: Message) {
        tracing::debug!(role = ?message.role, len = message.content.len(), "Appending message");
        self.history.write().push(message);
    }
}
