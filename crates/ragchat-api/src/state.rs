//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use ragchat_chat::{build_backend, ChatBackend, ChatSession};
use ragchat_core::config::RagchatConfig;
use ragchat_core::{RagchatError, Result};

use crate::upstream::UpstreamClient;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RagchatConfig>,
    /// The one chat transcript this server drives.
    pub session: Arc<ChatSession>,
    pub upstream: Arc<UpstreamClient>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build state with the backend selected in `config.chat.backend`.
    pub fn new(config: RagchatConfig) -> Result<Self> {
        let backend = build_backend(&config).map_err(|e| RagchatError::Config(e.to_string()))?;
        Self::with_backend(config, backend)
    }

    /// Build state around an explicit chat backend.
    pub fn with_backend(config: RagchatConfig, backend: Arc<dyn ChatBackend>) -> Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let session = ChatSession::new(&config.chat, backend);
        Ok(Self {
            config: Arc::new(config),
            session: Arc::new(session),
            upstream: Arc::new(upstream),
            start_time: Instant::now(),
        })
    }
}
