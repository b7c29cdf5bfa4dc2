//! Integration tests for the ragchat API.
//!
//! Chat endpoints run against an in-process stub backend; the proxies run
//! against stub upstream services bound to ephemeral ports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use ragchat_api::create_router;
use ragchat_api::handlers::HealthResponse;
use ragchat_api::state::AppState;
use ragchat_chat::{BackendReply, ChatBackend, ChatError, ExchangeRequest, ResponseKind, ResultItem};
use ragchat_core::config::RagchatConfig;

// =============================================================================
// Helpers
// =============================================================================

/// Answers "find" with 25 results and echoes everything else.
struct StubBackend;

#[async_trait]
impl ChatBackend for StubBackend {
    async fn ask(&self, request: &ExchangeRequest) -> Result<BackendReply, ChatError> {
        if request.message == "find" {
            let results = (1..=25)
                .map(|i| ResultItem {
                    id: format!("doc-{i}"),
                    title: format!("Document {i}"),
                    registered_date: "2024-05-01".into(),
                })
                .collect();
            return Ok(BackendReply {
                answer: "found 25".into(),
                kind: ResponseKind::WithResults,
                results,
            });
        }
        Ok(BackendReply::plain(format!("echo: {}", request.message)))
    }
}

/// Blocks every exchange until released.
struct GatedBackend {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ChatBackend for GatedBackend {
    async fn ask(&self, _request: &ExchangeRequest) -> Result<BackendReply, ChatError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(BackendReply::plain("late"))
    }
}

fn make_state_with(config: RagchatConfig, backend: Arc<dyn ChatBackend>) -> AppState {
    AppState::with_backend(config, backend).unwrap()
}

fn make_app() -> Router {
    create_router(make_state_with(RagchatConfig::default(), Arc::new(StubBackend)))
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn put_json(uri: &str, json: &str) -> Request<Body> {
    Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    String::from_utf8(body_bytes(resp).await).unwrap()
}

/// Serve `router` on 127.0.0.1 and return its base URL.
async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Submit "find" and return the app plus the id of the bot message.
async fn app_with_results() -> (Router, String) {
    let app = make_app();
    let resp = app
        .clone()
        .oneshot(post_json("/chat/messages", r#"{"text": "find"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view = body_json(resp).await;
    let id = view["messages"][1]["id"].as_str().unwrap().to_string();
    (app, id)
}

// =============================================================================
// Health and UI
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let resp = make_app().oneshot(get_req("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.messages, 0);
}

#[tokio::test]
async fn test_ui_serves_welcome_page() {
    let resp = make_app().oneshot(get_req("/ui")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.contains("text/html"));

    let html = body_text(resp).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("무엇을 도와드릴까요?"));
    assert!(html.contains("이미지 만들기"));
}

#[tokio::test]
async fn test_ui_transcript_fragment_reflects_session() {
    let app = make_app();
    app.clone()
        .oneshot(post_json("/chat/messages", r#"{"text": "<b>hello</b>"}"#))
        .await
        .unwrap();

    let resp = app.oneshot(get_req("/ui/transcript")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(!html.contains("<!DOCTYPE html>"));
    assert!(html.contains("&lt;b&gt;hello&lt;/b&gt;"));
    assert!(html.contains("echo: &lt;b&gt;hello&lt;/b&gt;"));
    assert!(!html.contains("무엇을 도와드릴까요?"));
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_get_chat_starts_empty() {
    let resp = make_app().oneshot(get_req("/chat")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view = body_json(resp).await;
    assert_eq!(view["state"], "idle");
    assert_eq!(view["messages"], json!([]));
}

#[tokio::test]
async fn test_submit_message_returns_resolved_view() {
    let resp = make_app()
        .oneshot(post_json("/chat/messages", r#"{"text": "hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let view = body_json(resp).await;
    let messages = view["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["text"], "hi");
    assert_eq!(messages[1]["role"], "bot");
    assert_eq!(messages[1]["text"], "echo: hi");
    assert!(messages[1]["results"].is_null());
}

#[tokio::test]
async fn test_blank_submission_is_ignored() {
    let resp = make_app()
        .oneshot(post_json("/chat/messages", r#"{"text": "   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["messages"], json!([]));
}

#[tokio::test]
async fn test_too_long_submission_is_rejected() {
    let text = "x".repeat(2001);
    let resp = make_app()
        .oneshot(post_json("/chat/messages", &json!({ "text": text }).to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "bad_request");
}

#[tokio::test]
async fn test_overlapping_submission_conflicts() {
    let backend = Arc::new(GatedBackend {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let app = create_router(make_state_with(RagchatConfig::default(), backend.clone()));

    let first = tokio::spawn(
        app.clone()
            .oneshot(post_json("/chat/messages", r#"{"text": "first"}"#)),
    );
    backend.entered.notified().await;

    let resp = app
        .clone()
        .oneshot(post_json("/chat/messages", r#"{"text": "second"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"], "conflict");

    let view = body_json(app.clone().oneshot(get_req("/chat")).await.unwrap()).await;
    assert_eq!(view["state"], "awaiting_response");
    assert_eq!(view["messages"][1]["role"], "pending");

    backend.release.notify_one();
    let resp = first.await.unwrap().unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["messages"][1]["text"], "late");
}

#[tokio::test]
async fn test_quick_action_submits_canned_text() {
    let resp = make_app()
        .oneshot(post_empty("/chat/actions/advice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view = body_json(resp).await;
    assert_eq!(view["messages"][0]["text"], "예제3입니다.");
    assert_eq!(view["messages"][1]["text"], "echo: 예제3입니다.");
}

#[tokio::test]
async fn test_unknown_quick_action_is_bad_request() {
    let resp = make_app()
        .oneshot(post_empty("/chat/actions/dance"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_clears_transcript() {
    let (app, _) = app_with_results().await;
    let resp = app.clone().oneshot(post_empty("/chat/reset")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["messages"], json!([]));

    let health = body_json(app.oneshot(get_req("/health")).await.unwrap()).await;
    assert_eq!(health["messages"], 0);
}

#[tokio::test]
async fn test_results_start_expanded_on_first_page() {
    let (app, _) = app_with_results().await;
    let view = body_json(app.oneshot(get_req("/chat")).await.unwrap()).await;
    let results = &view["messages"][1]["results"];
    assert_eq!(results["expanded"], true);
    assert_eq!(results["total"], 25);
    assert_eq!(results["items"].as_array().unwrap().len(), 10);
    assert_eq!(results["items"][0]["id"], "doc-1");
    assert_eq!(results["pagination"]["current_page"], 1);
    assert_eq!(results["pagination"]["page_count"], 3);
    assert_eq!(results["pagination"]["has_prev"], false);
}

#[tokio::test]
async fn test_set_page_moves_and_clamps() {
    let (app, id) = app_with_results().await;

    let resp = app
        .clone()
        .oneshot(put_json(&format!("/chat/messages/{id}/page"), r#"{"page": 3}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let results = body_json(resp).await["messages"][1]["results"].clone();
    assert_eq!(results["items"].as_array().unwrap().len(), 5);
    assert_eq!(results["items"][0]["id"], "doc-21");
    assert_eq!(results["pagination"]["has_next"], false);

    let resp = app
        .oneshot(put_json(&format!("/chat/messages/{id}/page"), r#"{"page": 0}"#))
        .await
        .unwrap();
    let results = body_json(resp).await["messages"][1]["results"].clone();
    assert_eq!(results["pagination"]["current_page"], 1);
}

#[tokio::test]
async fn test_set_page_unknown_message_is_not_found() {
    let resp = make_app()
        .oneshot(put_json(
            "/chat/messages/6f1c9a52-3a1e-4b8e-9d55-0c2a4f7d9e10/page",
            r#"{"page": 2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "not_found");
}

#[tokio::test]
async fn test_malformed_message_id_is_bad_request() {
    let resp = make_app()
        .oneshot(post_empty("/chat/messages/not-a-uuid/toggle"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_collapses_and_keeps_page() {
    let (app, id) = app_with_results().await;
    app.clone()
        .oneshot(put_json(&format!("/chat/messages/{id}/page"), r#"{"page": 2}"#))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(post_empty(&format!("/chat/messages/{id}/toggle")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let results = body_json(resp).await["messages"][1]["results"].clone();
    assert_eq!(results["expanded"], false);
    assert_eq!(results["pagination"]["current_page"], 2);

    let resp = app
        .oneshot(post_empty(&format!("/chat/messages/{id}/toggle")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["messages"][1]["results"]["expanded"], true);
}

// =============================================================================
// Proxies
// =============================================================================

fn app_for_upstream(base: &str) -> Router {
    let mut config = RagchatConfig::default();
    config.upstream.llm_url = format!("{base}/llm");
    config.upstream.rag_url = format!("{base}/rag");
    config.upstream.timeout_secs = 5;
    create_router(make_state_with(config, Arc::new(StubBackend)))
}

fn upstream_router() -> Router {
    Router::new()
        .route(
            "/llm",
            post(|Json(body): Json<Value>| async move {
                let prior = body["previousMessages"].as_array().map(|a| a.len()).unwrap_or(0);
                Json(json!({
                    "answer": format!("{} ({} prior)", body["message"].as_str().unwrap_or(""), prior),
                    "model": "ignored"
                }))
            }),
        )
        .route(
            "/rag",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let page = params.get("page").cloned().unwrap_or_default();
                Json(json!({
                    "results": [{"page": page, "title": "doc"}],
                    "totalPages": 7
                }))
            }),
        )
}

#[tokio::test]
async fn test_llm_proxy_unwraps_answer() {
    let base = spawn_upstream(upstream_router()).await;
    let resp = app_for_upstream(&base)
        .oneshot(post_json(
            "/api/llm",
            r#"{"message": "hello", "previousMessages": [{"role": "user", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"response": "hello (1 prior)"}));
}

#[tokio::test]
async fn test_llm_proxy_upstream_failure_is_bad_gateway() {
    let router = Router::new().route(
        "/llm",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_upstream(router).await;
    let resp = app_for_upstream(&base)
        .oneshot(post_json("/api/llm", r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["error"], "bad_gateway");
}

#[tokio::test]
async fn test_llm_proxy_malformed_upstream_is_bad_gateway() {
    let router = Router::new().route("/llm", post(|| async { Json(json!({"text": "no answer"})) }));
    let base = spawn_upstream(router).await;
    let resp = app_for_upstream(&base)
        .oneshot(post_json("/api/llm", r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_rag_proxy_defaults_to_first_page() {
    let base = spawn_upstream(upstream_router()).await;
    let resp = app_for_upstream(&base)
        .oneshot(get_req("/api/rag"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["totalPages"], 7);
    assert_eq!(body["results"][0]["page"], "1");
}

#[tokio::test]
async fn test_rag_proxy_forwards_page() {
    let base = spawn_upstream(upstream_router()).await;
    let resp = app_for_upstream(&base)
        .oneshot(get_req("/api/rag?page=4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["results"][0]["page"], "4");
}

#[tokio::test]
async fn test_rag_proxy_non_numeric_page_is_bad_request() {
    let resp = make_app()
        .oneshot(get_req("/api/rag?page=abc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "bad_request");
}

#[tokio::test]
async fn test_rag_proxy_unreachable_upstream_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resp = app_for_upstream(&format!("http://{addr}"))
        .oneshot(get_req("/api/rag?page=2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
