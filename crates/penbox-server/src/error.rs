//! Error types for the Penbox HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body is JSON of the form `{"error": ..., "status": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use penbox_db::{BulkDeleteReport, StoreError};
use penbox_types::UnknownFragmentKind;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requested preview revision has been superseded.
    #[error("preview revision {0} is no longer current")]
    Gone(u64),

    /// The path named a fragment kind other than `html`, `css` or `js`.
    #[error("invalid fragment kind: {0}")]
    InvalidKind(#[from] UnknownFragmentKind),

    /// The request did not come from the host page's origin.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A snapshot ID could not be parsed from the request path.
    #[error("invalid snapshot ID: {0}")]
    InvalidId(String),

    /// The snapshot store failed.
    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),

    /// A bulk delete finished with some deletes failed.
    #[error("bulk delete incomplete: {} deleted, {} failed", .0.deleted, .0.failed)]
    PartialDelete(BulkDeleteReport),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Gone(_) => StatusCode::GONE,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidKind(_) | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::PartialDelete(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(error = %self, "API request failed");
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let (Self::PartialDelete(report), Some(fields)) = (&self, body.as_object_mut()) {
            fields.insert("deleted".to_owned(), report.deleted.into());
            fields.insert("failed".to_owned(), report.failed.into());
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use penbox_types::SnapshotId;

    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (ApiError::NotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (ApiError::Gone(3), StatusCode::GONE),
            (
                ApiError::Forbidden("foreign origin null".to_owned()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::InvalidKind(UnknownFragmentKind("ts".to_owned())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::InvalidId("nope".to_owned()), StatusCode::BAD_REQUEST),
            (
                ApiError::Store(StoreError::NotFound(SnapshotId::new())),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::Store(StoreError::Unavailable), StatusCode::BAD_GATEWAY),
            (
                ApiError::PartialDelete(BulkDeleteReport { deleted: 1, failed: 2 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn partial_delete_body_carries_counts() {
        let response =
            ApiError::PartialDelete(BulkDeleteReport { deleted: 2, failed: 1 }).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 500);
        assert_eq!(json["deleted"], 2);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["error"], "bulk delete incomplete: 2 deleted, 1 failed");
    }
}
