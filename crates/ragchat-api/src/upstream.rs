//! HTTP client for the two proxied upstream services.
//!
//! Both calls are single attempts: transport errors, non-success statuses,
//! and bodies that do not parse all become [`RagchatError::Upstream`].

use std::time::Duration;

use ragchat_core::config::UpstreamConfig;
use ragchat_core::types::{LlmProxyRequest, LlmProxyResponse, LlmUpstreamAnswer, RagPage};
use ragchat_core::{RagchatError, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct UpstreamClient {
    client: reqwest::Client,
    llm_url: String,
    rag_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| RagchatError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            llm_url: config.llm_url.clone(),
            rag_url: config.rag_url.clone(),
        })
    }

    /// POST the request to the LLM service and unwrap its `answer`.
    pub async fn forward_llm(&self, request: &LlmProxyRequest) -> Result<LlmProxyResponse> {
        debug!(url = %self.llm_url, history = request.previous_messages.len(), "Forwarding to LLM");
        let response = self
            .client
            .post(&self.llm_url)
            .json(request)
            .send()
            .await
            .map_err(|e| RagchatError::Upstream(format!("LLM request failed: {}", e)))?;
        let answer: LlmUpstreamAnswer = read_json(response, "LLM").await?;
        Ok(LlmProxyResponse {
            response: answer.answer,
        })
    }

    /// GET one page of search results.
    pub async fn fetch_rag(&self, page: u32) -> Result<RagPage> {
        debug!(url = %self.rag_url, page, "Fetching RAG page");
        let response = self
            .client
            .get(&self.rag_url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|e| RagchatError::Upstream(format!("RAG request failed: {}", e)))?;
        read_json(response, "RAG").await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, service: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(RagchatError::Upstream(format!(
            "{} service returned {}",
            service, status
        )));
    }
    let text = response
        .text()
        .await
        .map_err(|e| RagchatError::Upstream(format!("failed to read {} response: {}", service, e)))?;
    serde_json::from_str(&text)
        .map_err(|e| RagchatError::Upstream(format!("malformed {} response: {}", service, e)))
}
