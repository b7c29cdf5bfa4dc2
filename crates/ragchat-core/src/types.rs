//! Wire types shared by the chat backend and the proxy endpoints.
//!
//! Field names follow the external services exactly (`page_content`,
//! `previousMessages`, `totalPages`), so these structs are the only place
//! where those spellings appear.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Answer service (`GET {backend_url}?req=...`)
// =============================================================================

/// Reply of the answer service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendAnswer {
    pub answer: String,
    /// 0 = plain answer, 1 = answer with attached documents.
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub rag: Option<Vec<RagDocument>>,
}

/// One retrieved document attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagDocument {
    #[serde(default)]
    pub page_content: String,
    #[serde(default)]
    pub metadata: RagMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagMetadata {
    #[serde(default, deserialize_with = "string_or_number")]
    pub register_date: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
}

/// Accept a JSON string, number, or null and produce a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    })
}

// =============================================================================
// Conversation history
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn sent along with a new message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

// =============================================================================
// LLM proxy (`POST /api/llm`)
// =============================================================================

/// Body accepted by the LLM proxy and forwarded verbatim upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProxyRequest {
    pub message: String,
    #[serde(rename = "previousMessages", default)]
    pub previous_messages: Vec<Value>,
}

/// Upstream LLM reply; only `answer` is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmUpstreamAnswer {
    pub answer: String,
}

/// Body returned by the LLM proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProxyResponse {
    pub response: String,
}

// =============================================================================
// RAG proxy (`GET /api/rag?page=N`)
// =============================================================================

/// Page of search results; used for both the upstream reply and the proxy
/// response. Result records are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagPage {
    pub results: Vec<Value>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}
