//! Chat core for ragchat.
//!
//! Owns the transcript state machine, the per-message paginated results
//! view model, quick actions, and the backends an exchange is sent to.

pub mod actions;
pub mod backend;
pub mod error;
pub mod session;
pub mod transcript;
pub mod types;
pub mod view;

pub use actions::QuickAction;
pub use backend::{build_backend, ChatBackend, DirectBackend, LlmProxyBackend};
pub use error::ChatError;
pub use session::{ChatSession, SubmitOutcome};
pub use transcript::{Exchange, Resolution, Transcript, TranscriptState};
pub use types::{
    BackendReply, ChatMessage, ExchangeRequest, Message, MessageId, ResponseKind, ResultItem,
};
pub use view::{MessageView, PageWindow, ResultsView, TranscriptView};
