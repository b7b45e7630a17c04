use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::domain::error::EnumerationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EnumerationError> for ApiError {
    fn from(err: EnumerationError) -> Self {
        ApiError::Internal(format!("failed to collect process info: {err}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("failed to encode snapshot: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_error_is_internal() {
        let err: ApiError = EnumerationError::Listing("denied".into()).into();
        assert!(err.to_string().contains("denied"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
