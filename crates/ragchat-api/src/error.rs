//! API error types and JSON error response formatting.
//!
//! Every failing endpoint answers with `{"error": code, "message": text}` and
//! a status derived from the underlying chat or core error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ragchat_chat::ChatError;
use ragchat_core::RagchatError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "bad_gateway").
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - invalid parameters or body.
    BadRequest(String),
    /// 404 - no such message.
    NotFound(String),
    /// 409 - an exchange is already in flight.
    Conflict(String),
    /// 502 - the upstream service failed or answered garbage.
    BadGateway(String),
    /// 500
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MessageTooLong(_) | ChatError::UnknownAction(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::ExchangeInFlight => ApiError::Conflict(err.to_string()),
            ChatError::MessageNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::Backend(_) => ApiError::BadGateway(err.to_string()),
            ChatError::StateError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RagchatError> for ApiError {
    fn from(err: RagchatError) -> Self {
        match &err {
            RagchatError::Upstream(msg) => ApiError::BadGateway(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_chat::MessageId;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_chat_errors_map_to_statuses() {
        assert_eq!(
            status_of(ChatError::ExchangeInFlight.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ChatError::MessageTooLong(10).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ChatError::UnknownAction("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ChatError::MessageNotFound(MessageId::new()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ChatError::Backend("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ChatError::StateError("poisoned".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_error_is_bad_gateway() {
        let err: ApiError = RagchatError::Upstream("timeout".into()).into();
        assert!(matches!(err, ApiError::BadGateway(ref m) if m == "timeout"));

        let err: ApiError = RagchatError::Config("bad".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
