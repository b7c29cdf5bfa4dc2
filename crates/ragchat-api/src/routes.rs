//! Router setup with all routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use ragchat_core::config::RagchatConfig;
use ragchat_core::{RagchatError, Result};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let port = state.config.server.port;
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let proxy_routes = Router::new()
        .route("/api/llm", post(handlers::llm_proxy))
        .route("/api/rag", get(handlers::rag_proxy));

    let chat_routes = Router::new()
        .route("/chat", get(handlers::get_chat))
        .route("/chat/messages", post(handlers::submit_message))
        .route("/chat/actions/{action}", post(handlers::quick_action))
        .route("/chat/reset", post(handlers::reset))
        .route("/chat/messages/{id}/page", put(handlers::set_page))
        .route("/chat/messages/{id}/toggle", post(handlers::toggle));

    let page_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ui", get(handlers::ui))
        .route("/ui/transcript", get(handlers::ui_transcript));

    page_routes
        .merge(proxy_routes)
        .merge(chat_routes)
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `server.host:server.port` and serve until ctrl-c.
pub async fn start_server(config: &RagchatConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RagchatError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");
    tracing::info!("Chat UI at http://{}/ui", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| RagchatError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
