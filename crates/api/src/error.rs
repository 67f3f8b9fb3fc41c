//! API Error Types

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// No sensor matched the request
    #[error("Sensor not found")]
    NotFound,

    /// Path or query string did not deserialize
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything the storage layer could not do
    #[error("Storage failure: {0}")]
    Storage(StorageError),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidRequest(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail.clone()),
            ApiError::Storage(err) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(StorageError::NotFound);
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_error_maps_to_500() {
        let err = ApiError::from(StorageError::DatabaseError(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, ApiError::Storage(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_request_maps_to_422() {
        let response = ApiError::InvalidRequest("bad id".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
