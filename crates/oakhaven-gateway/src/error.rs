//! Error types for the connection gateway.
//!
//! [`GatewayError`] unifies HTTP and session-auth failure modes into a
//! single enum with an [`IntoResponse`](axum::response::IntoResponse)
//! implementation for the HTTP companion surface. `WebSocket`-side auth
//! failures are reported as a protocol `error` message plus a close
//! frame rather than through this type (see [`crate::ws`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the gateway's HTTP and session layers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid query parameter or request body was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// A session token failed verification, or a bearer credential did
    /// not match the configured registration secret.
    #[error("authentication error: {0}")]
    Auth(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Serialization(err) => (StatusCode::BAD_REQUEST, format!("JSON error: {err}")),
            Self::InvalidQuery(msg) | Self::InvalidUuid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
