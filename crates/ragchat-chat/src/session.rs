//! Chat session: the transcript behind one lock, driven by a backend.
//!
//! Every mutation of the transcript and its view state goes through the
//! session mutex. The backend call and its resolution run in a spawned task
//! that owns a handle to the transcript, so an exchange always resolves even
//! when the caller stops waiting.

use std::sync::{Arc, Mutex, MutexGuard};

use ragchat_core::config::ChatConfig;
use tracing::{info, warn};

use crate::actions::QuickAction;
use crate::backend::ChatBackend;
use crate::error::ChatError;
use crate::transcript::{Resolution, Transcript};
use crate::types::MessageId;
use crate::view::TranscriptView;

/// Result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    Answered(MessageId),
    /// The exchange failed and the error message was shown.
    Failed(MessageId),
    /// The transcript was reset before the answer arrived.
    Discarded,
}

pub struct ChatSession {
    transcript: Arc<Mutex<Transcript>>,
    backend: Arc<dyn ChatBackend>,
}

fn lock_transcript(transcript: &Mutex<Transcript>) -> Result<MutexGuard<'_, Transcript>, ChatError> {
    transcript
        .lock()
        .map_err(|e| ChatError::StateError(format!("transcript lock poisoned: {}", e)))
}

impl ChatSession {
    pub fn new(config: &ChatConfig, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            transcript: Arc::new(Mutex::new(Transcript::new(config))),
            backend,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Transcript>, ChatError> {
        lock_transcript(&self.transcript)
    }

    /// Submit `text` and wait for the exchange to resolve.
    ///
    /// Dropping the returned future does not abandon the exchange: the
    /// backend call and resolution continue in the background.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, ChatError> {
        let exchange = {
            let mut transcript = self.lock()?;
            match transcript.begin_exchange(text)? {
                Some(exchange) => exchange,
                None => return Ok(SubmitOutcome::Ignored),
            }
        };

        let transcript = Arc::clone(&self.transcript);
        let backend = Arc::clone(&self.backend);
        let task = tokio::spawn(async move {
            let outcome = backend.ask(exchange.request()).await;
            if let Err(ref e) = outcome {
                warn!(error = %e, pending_id = %exchange.pending_id(), "Exchange failed");
            }
            let resolution = lock_transcript(&transcript)?.resolve(exchange, outcome);
            Ok::<_, ChatError>(resolution)
        });

        let resolution = task
            .await
            .map_err(|e| ChatError::StateError(format!("exchange task failed: {}", e)))??;
        Ok(match resolution {
            Resolution::Answered(id) => {
                info!(%id, "Exchange answered");
                SubmitOutcome::Answered(id)
            }
            Resolution::Failed(id) => SubmitOutcome::Failed(id),
            Resolution::Stale => SubmitOutcome::Discarded,
        })
    }

    /// Submit the canned text of a quick action.
    pub async fn quick_action(&self, action: QuickAction) -> Result<SubmitOutcome, ChatError> {
        info!(action = %action, "Quick action");
        self.submit(action.canned_text()).await
    }

    pub fn reset(&self) -> Result<(), ChatError> {
        self.lock()?.reset();
        Ok(())
    }

    pub fn set_page(&self, id: MessageId, page: usize) -> Result<usize, ChatError> {
        self.lock()?.set_page(id, page)
    }

    pub fn toggle_expansion(&self, id: MessageId) -> Result<bool, ChatError> {
        self.lock()?.toggle_expansion(id)
    }

    pub fn view(&self) -> Result<TranscriptView, ChatError> {
        Ok(self.lock()?.view())
    }

    pub fn message_count(&self) -> usize {
        self.lock().map(|t| t.len()).unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
