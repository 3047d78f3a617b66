use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use std::time::Duration;
use thiserror::Error;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch robots data";
pub const ENCODE_FAILED_MESSAGE: &str = "Failed to encode robots data";

#[derive(Error, Debug)]
pub enum RobotsError {
    #[error("connection error: {0}")]
    Connection(#[source] mongodb::error::Error),

    #[error("query error: {0}")]
    Query(#[source] mongodb::error::Error),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("shutdown error: {0}")]
    Shutdown(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RobotsError> for AppError {
    fn from(err: RobotsError) -> Self {
        match err {
            RobotsError::Connection(e) | RobotsError::Query(e) => AppError::from(e),
            RobotsError::Timeout(_) => AppError::DatabaseError(anyhow::anyhow!(err.to_string())),
            RobotsError::Shutdown(_) => AppError::DatabaseError(anyhow::anyhow!(err.to_string())),
            RobotsError::Encode(e) => AppError::InternalError(anyhow::Error::new(e)),
            RobotsError::Internal(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
        }
    }
}

/// Clients only ever see a fixed plain-text message; details go to the log.
impl IntoResponse for RobotsError {
    fn into_response(self) -> Response {
        let message = match &self {
            RobotsError::Encode(_) => ENCODE_FAILED_MESSAGE,
            _ => FETCH_FAILED_MESSAGE,
        };

        tracing::error!(error = %self, "Request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: RobotsError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_timeout_renders_fixed_fetch_message() {
        let (status, body) = body_of(RobotsError::Timeout(Duration::from_secs(30))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FETCH_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_encode_renders_fixed_encode_message() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let (status, body) = body_of(RobotsError::Encode(json_err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, ENCODE_FAILED_MESSAGE);
    }

    #[test]
    fn test_timeout_maps_to_database_error() {
        let err: AppError = RobotsError::Timeout(Duration::from_secs(1)).into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_shutdown_display() {
        let err = RobotsError::Shutdown("timed out after 10s".to_string());
        assert_eq!(err.to_string(), "shutdown error: timed out after 10s");
    }
}
