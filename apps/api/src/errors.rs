use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as the single-key object `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Blank job description.
    #[error("{0}")]
    EmptyInput(String),

    /// Request body or query string could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing to rank: empty catalog, no retrieval hits, or no rerank candidates.
    #[error("{0}")]
    EmptyCatalog(String),

    /// Embedding or generation call failed, or returned unparseable content.
    #[error("{0}")]
    ExternalService(String),

    /// Parsed model output is missing the required top-level shape.
    #[error("{0}")]
    ResponseShape(String),

    #[error("Error processing request: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyInput(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EmptyCatalog(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) | AppError::ResponseShape(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::ExternalService(msg) => tracing::error!("External service error: {msg}"),
            AppError::ResponseShape(msg) => tracing::error!("Response shape error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::EmptyInput(_) | AppError::InvalidRequest(_) | AppError::EmptyCatalog(_) => {}
        }

        let message = match &self {
            AppError::Internal(_) => "Error processing request: an internal error occurred".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_variant() {
        assert_eq!(
            AppError::EmptyInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::EmptyCatalog("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ResponseShape("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_single_key_object() {
        let response = AppError::EmptyInput("Please enter a job description".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Please enter a job description" }));
    }
}
