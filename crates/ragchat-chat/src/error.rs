//! Error types for the chat core.

use ragchat_core::error::RagchatError;

use crate::types::MessageId;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("an exchange is already in flight")]
    ExchangeInFlight,
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("unknown quick action: {0}")]
    UnknownAction(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("state error: {0}")]
    StateError(String),
}

impl From<RagchatError> for ChatError {
    fn from(err: RagchatError) -> Self {
        match err {
            RagchatError::Upstream(msg) => ChatError::Backend(msg),
            other => ChatError::StateError(other.to_string()),
        }
    }
}
