//! HTTP error mapping.
//!
//! Handlers return `Result<_, ApiError>`. The status code for each failure is
//! decided here and nowhere else; the body is always `{"error": "<message>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use todo_store::StoreError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed path, query or body.
    #[error("{0}")]
    InvalidRequest(String),

    /// No task with the requested id.
    #[error("{0}")]
    TaskNotFound(String),

    /// Repository failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else, e.g. a blocking task that panicked.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Store(StoreError::InvalidFilter { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::TaskNotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::TaskNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(StoreError::Schema {
                message: "x".into()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_filter_is_client_error() {
        let err = ApiError::from(StoreError::InvalidFilter {
            key: "id".into(),
            value: "abc".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "invalid value for search filter id: \"abc\"");
    }

    #[tokio::test]
    async fn response_body_is_error_object() {
        let resp = ApiError::TaskNotFound("task 7 not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body, json!({ "error": "task 7 not found" }));
    }

    #[tokio::test]
    async fn store_error_response() {
        let err = StoreError::Io(std::io::Error::other("disk gone"));
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "io error: disk gone");
    }
}
