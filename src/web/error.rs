use crate::core::SyncError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    Input(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::NotFound(_) => Self::NotFound(err.to_string()),
            SyncError::ConflictOnCreate(_) => Self::Conflict(err.to_string()),
            SyncError::Validation(message) => Self::Input(message),
            SyncError::Infrastructure(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            ApiError::Input(msg) => (StatusCode::BAD_REQUEST, msg, "input_error"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "not_found"),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "conflict"),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed on a store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store operation failed".to_string(),
                    "internal_error",
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StoreError;

    fn status_of(err: SyncError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn sync_errors_map_to_statuses() {
        assert_eq!(status_of(SyncError::not_found(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(SyncError::ConflictOnCreate("1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SyncError::validation("name must not be blank")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::Backend("pool timed out".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn infrastructure_detail_is_not_exposed() {
        let response = ApiError::from(SyncError::from(StoreError::Backend(
            "password authentication failed".into(),
        )))
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "internal_error");
        assert!(!json["error"].as_str().unwrap().contains("password"));
    }
}
