//! Transcript message types and the backend reply they are built from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ragchat_core::types::{BackendAnswer, HistoryEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a transcript entry.
///
/// View state (page, expansion) is keyed by this id rather than by position,
/// so it stays attached to the right message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MessageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a bot answer carries retrieved documents.
///
/// Serialized as the integer the answer service uses (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ResponseKind {
    #[default]
    Plain,
    WithResults,
}

impl From<u8> for ResponseKind {
    fn from(value: u8) -> Self {
        match value {
            1 => ResponseKind::WithResults,
            _ => ResponseKind::Plain,
        }
    }
}

impl From<ResponseKind> for u8 {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::Plain => 0,
            ResponseKind::WithResults => 1,
        }
    }
}

impl From<i64> for ResponseKind {
    fn from(value: i64) -> Self {
        if value == 1 {
            ResponseKind::WithResults
        } else {
            ResponseKind::Plain
        }
    }
}

/// A retrieved document attached to a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "registeredDate")]
    pub registered_date: String,
}

/// Body of a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        text: String,
    },
    /// Placeholder for the exchange currently in flight.
    Pending,
    Bot {
        text: String,
        kind: ResponseKind,
        results: Vec<ResultItem>,
    },
}

impl Message {
    pub fn is_pending(&self) -> bool {
        matches!(self, Message::Pending)
    }

    /// Attached results, empty for user, pending, and plain bot messages.
    pub fn results(&self) -> &[ResultItem] {
        match self {
            Message::Bot { results, .. } => results,
            _ => &[],
        }
    }
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: Message,
}

impl ChatMessage {
    pub fn new(body: Message) -> Self {
        Self {
            id: MessageId::new(),
            created_at: Utc::now(),
            body,
        }
    }
}

/// What a backend is asked: the new message plus the prior turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// A successful backend answer, already projected into transcript terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub answer: String,
    pub kind: ResponseKind,
    pub results: Vec<ResultItem>,
}

impl BackendReply {
    pub fn plain(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            kind: ResponseKind::Plain,
            results: Vec::new(),
        }
    }
}

impl From<BackendAnswer> for BackendReply {
    fn from(answer: BackendAnswer) -> Self {
        let results = answer
            .rag
            .unwrap_or_default()
            .into_iter()
            .map(|doc| ResultItem {
                id: doc.metadata.id,
                title: doc.page_content,
                registered_date: doc.metadata.register_date,
            })
            .collect();
        Self {
            answer: answer.answer,
            kind: ResponseKind::from(answer.kind),
            results,
        }
    }
}
