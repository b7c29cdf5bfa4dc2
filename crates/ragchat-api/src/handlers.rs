//! Route handler functions for all endpoints.
//!
//! Chat mutations answer with the updated [`TranscriptView`] so callers
//! never need a second round trip.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::Json;
use ragchat_chat::{MessageId, QuickAction, TranscriptView};
use ragchat_core::types::{LlmProxyRequest, LlmProxyResponse, RagPage};
use ragchat_ui::{render_main, render_page};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RagParams {
    /// Kept as text so a non-numeric page is a JSON 400, not an extractor rejection.
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub messages: usize,
}

// =============================================================================
// Upstream proxies
// =============================================================================

/// POST /api/llm - relay a message and its history to the LLM service.
pub async fn llm_proxy(
    State(state): State<AppState>,
    Json(request): Json<LlmProxyRequest>,
) -> Result<Json<LlmProxyResponse>, ApiError> {
    let reply = state.upstream.forward_llm(&request).await.map_err(|e| {
        warn!(error = %e, "LLM proxy failed");
        ApiError::from(e)
    })?;
    Ok(Json(reply))
}

/// GET /api/rag?page=N - relay one page of search results.
pub async fn rag_proxy(
    State(state): State<AppState>,
    Query(params): Query<RagParams>,
) -> Result<Json<RagPage>, ApiError> {
    let page = match params.page.as_deref() {
        None | Some("") => 1,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::BadRequest(format!("invalid page: {}", raw)))?,
    };
    let results = state.upstream.fetch_rag(page).await.map_err(|e| {
        warn!(error = %e, page, "RAG proxy failed");
        ApiError::from(e)
    })?;
    Ok(Json(results))
}

// =============================================================================
// Chat
// =============================================================================

fn parse_message_id(raw: &str) -> Result<MessageId, ApiError> {
    MessageId::from_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid message id: {}", raw)))
}

/// GET /chat - current transcript view.
pub async fn get_chat(State(state): State<AppState>) -> Result<Json<TranscriptView>, ApiError> {
    Ok(Json(state.session.view()?))
}

/// POST /chat/messages - submit text and wait for the exchange to resolve.
pub async fn submit_message(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<TranscriptView>, ApiError> {
    let outcome = state.session.submit(&body.text).await?;
    debug!(?outcome, "Submission finished");
    Ok(Json(state.session.view()?))
}

/// POST /chat/actions/{action} - submit a quick action's canned text.
pub async fn quick_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<TranscriptView>, ApiError> {
    let action = QuickAction::from_str(&action)?;
    state.session.quick_action(action).await?;
    Ok(Json(state.session.view()?))
}

/// POST /chat/reset - clear the transcript and all view state.
pub async fn reset(State(state): State<AppState>) -> Result<Json<TranscriptView>, ApiError> {
    state.session.reset()?;
    Ok(Json(state.session.view()?))
}

/// PUT /chat/messages/{id}/page - move a message's results to a page.
pub async fn set_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PageRequest>,
) -> Result<Json<TranscriptView>, ApiError> {
    let id = parse_message_id(&id)?;
    state.session.set_page(id, body.page)?;
    Ok(Json(state.session.view()?))
}

/// POST /chat/messages/{id}/toggle - expand or collapse a message's results.
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptView>, ApiError> {
    let id = parse_message_id(&id)?;
    state.session.toggle_expansion(id)?;
    Ok(Json(state.session.view()?))
}

// =============================================================================
// UI and health
// =============================================================================

/// GET /ui - the full chat page.
pub async fn ui(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let view = state.session.view()?;
    Ok(Html(render_page(&view, &state.config.chat)))
}

/// GET /ui/transcript - the main area fragment the page swaps in.
pub async fn ui_transcript(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let view = state.session.view()?;
    Ok(Html(render_main(&view, &state.config.chat)))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        messages: state.session.message_count(),
    })
}
