//! ragchat API crate - axum HTTP server and route handlers.
//!
//! Serves the two upstream proxies (`/api/llm`, `/api/rag`), the chat
//! endpoints the page drives (`/chat/...`), the rendered UI (`/ui`), and a
//! health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
pub use upstream::UpstreamClient;
