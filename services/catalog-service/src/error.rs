//! API error type and its HTTP mapping.
//!
//! | kind | status | body |
//! |---|---|---|
//! | validation / malformed request / duplicate | 400 | `{"errors": [..]}` |
//! | not found | 404 | `{"error": "<Entity> not found"}` |
//! | storage failure | 500 | `{"errors": [..], "message": ..}` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use common::ValidationError;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Request body or path could not be decoded, or a unique field is taken.
    #[error("{0}")]
    BadRequest(String),

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Failed to {action}")]
    Storage {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Classify a storage error raised while performing `action`.
    pub fn storage(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::Duplicate { .. } => Self::BadRequest(source.to_string()),
            StoreError::MissingReference { resource, .. } => Self::NotFound { resource },
            StoreError::Database(_) => Self::Storage { action, source },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::storage("read from the catalog")(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => {
                tracing::warn!(field = e.field(), "validation failed: {}", e);
                (StatusCode::BAD_REQUEST, json!({ "errors": [e.to_string()] }))
            }
            Self::BadRequest(msg) => {
                tracing::warn!("bad request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "errors": [msg] }))
            }
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            Self::Storage { source, .. } => {
                tracing::error!("{}: {}", self, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "errors": [self.to_string()],
                        "message": source.to_string(),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400_with_errors_list() {
        let (status, body) = body_of(ApiError::Validation(ValidationError::Empty {
            field: "image",
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["image cannot be empty"] }));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_of(ApiError::not_found("Game")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Game not found" }));
    }

    #[tokio::test]
    async fn storage_errors_are_classified() {
        let duplicate = ApiError::storage("add store")(StoreError::Duplicate {
            field: "name",
            value: "GameStop".into(),
        });
        let (status, body) = body_of(duplicate).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["name 'GameStop' already exists"] }));

        let missing = ApiError::storage("add listing")(StoreError::MissingReference {
            resource: "Store",
            id: 3,
        });
        assert_eq!(body_of(missing).await.0, StatusCode::NOT_FOUND);

        let failed = ApiError::storage("add game")(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = body_of(failed).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errors"], json!(["Failed to add game"]));
        assert!(body["message"].as_str().unwrap().contains("database error"));
    }
}
