//! Chat transcript state machine.
//!
//! Lifecycle of one exchange:
//! Idle -> (begin_exchange) -> AwaitingResponse -> (resolve) -> Idle
//!
//! `begin_exchange` appends the user message and a pending placeholder and
//! hands back an [`Exchange`] ticket. `resolve` consumes the ticket and
//! replaces the placeholder in place with the answer or the error message,
//! so every exchange is resolved exactly once.

use std::collections::HashMap;

use ragchat_core::config::ChatConfig;
use ragchat_core::types::{HistoryEntry, Role};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ChatError;
use crate::types::{BackendReply, ChatMessage, ExchangeRequest, Message, MessageId, ResponseKind};

/// Whole-transcript state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptState {
    Idle,
    AwaitingResponse,
}

/// Ticket for one in-flight exchange. Not `Clone`: it is consumed by
/// [`Transcript::resolve`].
#[derive(Debug)]
pub struct Exchange {
    pending_id: MessageId,
    request: ExchangeRequest,
}

impl Exchange {
    /// Id of the pending placeholder this exchange will replace.
    pub fn pending_id(&self) -> MessageId {
        self.pending_id
    }

    pub fn request(&self) -> &ExchangeRequest {
        &self.request
    }
}

/// How an exchange ended up in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The placeholder became the answer.
    Answered(MessageId),
    /// The placeholder became the fixed error message.
    Failed(MessageId),
    /// The placeholder no longer exists (transcript was reset).
    Stale,
}

/// Ordered chat transcript plus the per-message view state keyed by id.
///
/// The three collections live in one struct so a reset clears them together.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) pages: HashMap<MessageId, usize>,
    pub(crate) expanded: HashMap<MessageId, bool>,
    pub(crate) page_size: usize,
    max_message_length: usize,
    error_text: String,
}

impl Transcript {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            messages: Vec::new(),
            pages: HashMap::new(),
            expanded: HashMap::new(),
            page_size: config.page_size.max(1),
            max_message_length: config.max_message_length,
            error_text: config.error_text.clone(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn find(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn state(&self) -> TranscriptState {
        match self.messages.last() {
            Some(last) if last.body.is_pending() => TranscriptState::AwaitingResponse,
            _ => TranscriptState::Idle,
        }
    }

    /// Start an exchange for `text`.
    ///
    /// Returns `Ok(None)` without touching the transcript when `text` is
    /// blank. Only one exchange may be in flight at a time.
    pub fn begin_exchange(&mut self, text: &str) -> Result<Option<Exchange>, ChatError> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return Ok(None);
        }
        if self.state() == TranscriptState::AwaitingResponse {
            return Err(ChatError::ExchangeInFlight);
        }
        if text.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let history = self.history();
        self.messages.push(ChatMessage::new(Message::User {
            text: text.to_string(),
        }));
        let pending = ChatMessage::new(Message::Pending);
        let pending_id = pending.id;
        self.messages.push(pending);

        debug!(%pending_id, history_len = history.len(), "Exchange started");
        Ok(Some(Exchange {
            pending_id,
            request: ExchangeRequest {
                message: text.to_string(),
                history,
            },
        }))
    }

    /// Apply the outcome of an exchange.
    ///
    /// Either the full success update or the full failure update is applied.
    pub fn resolve(
        &mut self,
        exchange: Exchange,
        outcome: Result<BackendReply, ChatError>,
    ) -> Resolution {
        let Some(slot) = self
            .messages
            .iter_mut()
            .find(|m| m.id == exchange.pending_id && m.body.is_pending())
        else {
            debug!(pending_id = %exchange.pending_id, "Discarding stale exchange");
            return Resolution::Stale;
        };

        match outcome {
            Ok(reply) => {
                slot.body = Message::Bot {
                    text: reply.answer,
                    kind: reply.kind,
                    results: reply.results,
                };
                self.expanded.insert(exchange.pending_id, true);
                Resolution::Answered(exchange.pending_id)
            }
            Err(_) => {
                slot.body = Message::Bot {
                    text: self.error_text.clone(),
                    kind: ResponseKind::Plain,
                    results: Vec::new(),
                };
                Resolution::Failed(exchange.pending_id)
            }
        }
    }

    /// Clear the transcript and all per-message view state.
    pub fn reset(&mut self) {
        info!(messages = self.messages.len(), "Transcript reset");
        self.messages.clear();
        self.pages.clear();
        self.expanded.clear();
    }

    /// Prior turns, oldest first. Pending placeholders are skipped.
    fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter_map(|m| match &m.body {
                Message::User { text } => Some(HistoryEntry {
                    role: Role::User,
                    content: text.clone(),
                }),
                Message::Bot { text, .. } => Some(HistoryEntry {
                    role: Role::Assistant,
                    content: text.clone(),
                }),
                Message::Pending => None,
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
