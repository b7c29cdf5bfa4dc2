//! Backends an exchange is sent to.
//!
//! - `DirectBackend` queries the answer service with `GET ?req=...` and gets
//!   back the answer, its kind, and the retrieved documents.
//! - `LlmProxyBackend` posts the message and history to the LLM proxy and
//!   gets back a plain answer.
//!
//! Transport failures, non-success statuses, and malformed bodies all map to
//! [`ChatError::Backend`]; there is no retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ragchat_core::config::{BackendKind, RagchatConfig};
use ragchat_core::types::{BackendAnswer, LlmProxyRequest, LlmProxyResponse};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ChatError;
use crate::types::{BackendReply, ExchangeRequest};

/// Something that can answer one exchange.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, request: &ExchangeRequest) -> Result<BackendReply, ChatError>;
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ChatError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| ChatError::StateError(format!("failed to build HTTP client: {}", e)))
}

/// Read a response body and decode it, treating any non-2xx as a failure.
async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChatError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ChatError::Backend(format!("failed to read response body: {}", e)))?;
    if !status.is_success() {
        return Err(ChatError::Backend(format!("backend returned {}", status)));
    }
    serde_json::from_str(&text)
        .map_err(|e| ChatError::Backend(format!("malformed backend response: {}", e)))
}

// =============================================================================
// DirectBackend
// =============================================================================

pub struct DirectBackend {
    client: reqwest::Client,
    url: String,
}

impl DirectBackend {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ChatError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ChatBackend for DirectBackend {
    async fn ask(&self, request: &ExchangeRequest) -> Result<BackendReply, ChatError> {
        debug!(url = %self.url, "Querying answer service");
        let response = self
            .client
            .get(&self.url)
            .query(&[("req", request.message.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("request failed: {}", e)))?;
        let answer: BackendAnswer = decode_response(response).await?;
        Ok(BackendReply::from(answer))
    }
}

// =============================================================================
// LlmProxyBackend
// =============================================================================

pub struct LlmProxyBackend {
    client: reqwest::Client,
    url: String,
}

impl LlmProxyBackend {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ChatError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ChatBackend for LlmProxyBackend {
    async fn ask(&self, request: &ExchangeRequest) -> Result<BackendReply, ChatError> {
        let previous_messages = request
            .history
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ChatError::StateError(e.to_string()))?;
        let body = LlmProxyRequest {
            message: request.message.clone(),
            previous_messages,
        };

        debug!(url = %self.url, history = body.previous_messages.len(), "Posting to LLM proxy");
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Backend(format!("request failed: {}", e)))?;
        let reply: LlmProxyResponse = decode_response(response).await?;
        Ok(BackendReply::plain(reply.response))
    }
}

/// Build the backend selected by `chat.backend`.
pub fn build_backend(config: &RagchatConfig) -> Result<Arc<dyn ChatBackend>, ChatError> {
    let timeout = config.upstream.timeout_secs;
    Ok(match config.chat.backend {
        BackendKind::Direct => Arc::new(DirectBackend::new(&config.upstream.backend_url, timeout)?),
        BackendKind::LlmProxy => {
            Arc::new(LlmProxyBackend::new(config.llm_proxy_url(), timeout)?)
        }
    })
}
