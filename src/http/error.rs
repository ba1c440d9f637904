//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::blockchain::classify::{ClassifiedError, ErrorKind};
use crate::registrations::store::StoreError;

/// An error rendered as `{"error": "..."}` with an optional `kind`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    kind: Option<ErrorKind>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            kind: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// No chain client was configured for this deployment.
    pub fn chain_unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Chain access is not configured")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRecord(message) => Self::bad_request(message),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
                kind: Some(ErrorKind::StorageIOError),
            },
        }
    }
}

impl From<ClassifiedError> for ApiError {
    fn from(err: ClassifiedError) -> Self {
        let status = match err.kind {
            ErrorKind::StorageIOError | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.message,
            kind: Some(err.kind),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.kind {
            Some(kind) => json!({ "error": self.message, "kind": kind }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_record_is_bad_request() {
        let err = ApiError::from(StoreError::InvalidRecord("walletAddress is required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_transport_failure_is_bad_gateway() {
        let err = ApiError::from(ClassifiedError::new(ErrorKind::TransportError, "timeout"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
