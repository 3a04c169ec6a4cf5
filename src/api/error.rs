//! Error types for the query API.
//!
//! [`ApiError`] unifies all failure modes into a single enum converted to an
//! HTTP response via its [`IntoResponse`](axum::response::IntoResponse)
//! implementation: invalid input is a 400, storage failures and expired
//! deadlines are 500s.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::StoreError;

/// Errors that can occur in the query API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A missing or blank identifier, or otherwise invalid request input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store failed to execute the query.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The per-request deadline expired before the store answered.
    #[error("query deadline expired")]
    Timeout,

    /// Anything else that should surface as a server fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // A rejected block argument is caller error, not a store fault
            Self::Storage(StoreError::InvalidBlockArg(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Timeout | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "success": false,
            "message": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_400() {
        let resp = ApiError::BadRequest("missing pool identifier".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_block_arg_maps_to_400() {
        let resp =
            ApiError::Storage(StoreError::InvalidBlockArg("abc".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_maps_to_500() {
        let resp = ApiError::Timeout.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
